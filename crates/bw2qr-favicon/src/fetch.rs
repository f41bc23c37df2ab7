// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Favicon fetcher — blocking HTTP(S) client with short timeouts.
//
// Discovery chain:
//   1. <origin>/favicon.ico
//   2. <link rel="icon" ... href="*.png"> in the page HTML
//   3. the Google s2 favicon API
//
// The first response that decodes as an image wins. Nothing here returns
// an error: every failure is logged at debug level and the chain moves on.

use std::io::Read;
use std::time::Duration;

use tracing::{debug, info, instrument};

use bw2qr_core::IconSource;
use bw2qr_core::error::{Bw2QrError, Result};

use crate::html::{best_link, icon_links};
use crate::ico;
use crate::url::SiteUrl;

/// Connect and read timeout for every request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 3;

/// Largest response body accepted.
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

const MAX_REDIRECTS: u32 = 5;

const GOOGLE_FAVICON_API: &str = "https://www.google.com/s2/favicons";

/// Downloads website icons for logo badges.
#[derive(Debug, Clone)]
pub struct FaviconFetcher {
    agent: ureq::Agent,
    /// Base URL of the fallback favicon API; `None` disables the fallback.
    fallback_api: Option<String>,
}

impl Default for FaviconFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FaviconFetcher {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .redirects(MAX_REDIRECTS)
            .user_agent(concat!("bw2qr/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            fallback_api: Some(GOOGLE_FAVICON_API.to_owned()),
        }
    }

    /// Use another favicon API (same `domain` and `sz` query parameters).
    pub fn with_fallback_api(mut self, base: Option<String>) -> Self {
        self.fallback_api = base;
        self
    }

    /// GET `url` and return the body of a 200 response.
    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| Bw2QrError::Network(format!("GET {url}: {e}")))?;
        if response.status() != 200 {
            return Err(Bw2QrError::Network(format!(
                "GET {url}: unexpected status {}",
                response.status()
            )));
        }

        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES + 1)
            .read_to_end(&mut body)
            .map_err(|e| Bw2QrError::Network(format!("GET {url}: {e}")))?;

        if body.is_empty() {
            return Err(Bw2QrError::Network(format!("GET {url}: empty body")));
        }
        if body.len() as u64 > MAX_BODY_BYTES {
            return Err(Bw2QrError::Network(format!(
                "GET {url}: body larger than {MAX_BODY_BYTES} bytes"
            )));
        }
        Ok(body)
    }

    /// Download `url` and keep it only if it is a decodable image.
    fn download_icon(&self, url: &str, target_size: u32) -> Result<Vec<u8>> {
        let body = self.download(url)?;
        let icon = if ico::is_ico(&body) {
            ico::select(&body, target_size)
                .ok_or_else(|| Bw2QrError::ImageError(format!("{url}: broken .ico file")))?
        } else {
            body
        };
        image::load_from_memory(&icon)
            .map_err(|e| Bw2QrError::ImageError(format!("{url}: not an image: {e}")))?;
        Ok(icon)
    }

    fn from_favicon_ico(&self, site: &SiteUrl, target_size: u32) -> Result<Vec<u8>> {
        self.download_icon(&format!("{}/favicon.ico", site.origin()), target_size)
    }

    fn from_html_links(&self, site: &SiteUrl, target_size: u32) -> Result<Vec<u8>> {
        let page = self.download(&site.page())?;
        let links = icon_links(&String::from_utf8_lossy(&page));
        let link = best_link(&links, target_size)
            .ok_or_else(|| Bw2QrError::Network(format!("{}: no icon links", site.page())))?;
        self.download_icon(&site.join(&link.href), target_size)
    }

    fn from_fallback_api(&self, site: &SiteUrl, target_size: u32) -> Result<Vec<u8>> {
        let base = self
            .fallback_api
            .as_deref()
            .ok_or_else(|| Bw2QrError::Network("fallback api disabled".into()))?;
        let url = format!("{base}?domain={}&sz={target_size}", site.host);
        self.download_icon(&url, target_size)
    }
}

impl IconSource for FaviconFetcher {
    #[instrument(skip(self))]
    fn fetch_best_icon(&self, url: &str, target_size: u32) -> Option<Vec<u8>> {
        let Some(site) = SiteUrl::parse(url) else {
            debug!(url, "not a usable site url");
            return None;
        };

        let strategies: [(&str, fn(&Self, &SiteUrl, u32) -> Result<Vec<u8>>); 3] = [
            ("favicon.ico", Self::from_favicon_ico),
            ("html links", Self::from_html_links),
            ("fallback api", Self::from_fallback_api),
        ];
        for (name, strategy) in strategies {
            match strategy(self, &site, target_size) {
                Ok(icon) => {
                    info!(host = %site.host, strategy = name, bytes = icon.len(), "icon found");
                    return Some(icon);
                }
                Err(err) => debug!(host = %site.host, strategy = name, %err, "no icon"),
            }
        }
        None
    }
}
