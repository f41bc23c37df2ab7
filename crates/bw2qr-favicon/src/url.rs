// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Loose URL decomposition for vault entries, which often omit the scheme.

use std::sync::OnceLock;

use regex::Regex;

/// `[scheme://][www.]host[:port][path]`
const SITE_URL: &str = r"^(?:(https?)://)?(www\.)?([^:/?#\s]+)(?::([0-9]+))?((?:[/?#]\S*)?)$";

static SITE_URL_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn site_url() -> Option<&'static Regex> {
    SITE_URL_RE.get_or_init(|| Regex::new(SITE_URL).ok()).as_ref()
}

/// The parts of a site URL needed to fetch its icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrl {
    pub scheme: String,
    pub www: bool,
    /// Host without any `www.` prefix.
    pub host: String,
    pub port: u16,
    /// Path and query, always starting with `/`.
    pub path: String,
}

impl SiteUrl {
    /// Decompose `input`; `None` when it has no usable host.
    pub fn parse(input: &str) -> Option<Self> {
        let caps = site_url()?.captures(input.trim())?;

        let scheme = caps
            .get(1)
            .map_or("https", |m| m.as_str())
            .to_ascii_lowercase();
        let port = match caps.get(4) {
            Some(port) => port.as_str().parse().ok()?,
            None if scheme == "http" => 80,
            None => 443,
        };
        let path = match caps.get(5).map_or("", |m| m.as_str()) {
            "" => "/".to_owned(),
            p if p.starts_with('/') => p.replace("&amp;", "&"),
            p => format!("/{}", p.replace("&amp;", "&")),
        };

        Some(Self {
            scheme,
            www: caps.get(2).is_some(),
            host: caps.get(3)?.as_str().to_ascii_lowercase(),
            port,
            path,
        })
    }

    fn default_port(&self) -> u16 {
        if self.scheme == "http" { 80 } else { 443 }
    }

    /// `scheme://[www.]host[:port]`
    pub fn origin(&self) -> String {
        let www = if self.www { "www." } else { "" };
        if self.port == self.default_port() {
            format!("{}://{www}{}", self.scheme, self.host)
        } else {
            format!("{}://{www}{}:{}", self.scheme, self.host, self.port)
        }
    }

    /// The full URL of the page.
    pub fn page(&self) -> String {
        format!("{}{}", self.origin(), self.path)
    }

    /// Resolve `href` (absolute, scheme-relative or site-relative) against
    /// this site.
    pub fn join(&self, href: &str) -> String {
        let href = href.trim().replace("&amp;", "&");
        if href.starts_with("http://") || href.starts_with("https://") {
            href
        } else if let Some(rest) = href.strip_prefix("//") {
            format!("{}://{rest}", self.scheme)
        } else if href.starts_with('/') {
            format!("{}{href}", self.origin())
        } else {
            format!("{}/{href}", self.origin())
        }
    }
}
