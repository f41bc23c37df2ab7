// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bw2qr-favicon — finds a website's icon for the QR code logo badge.
//
// Tries, in order: the site's `/favicon.ico`, icon links in the page HTML,
// then a public favicon API. Every failure is absorbed and reported as
// "no icon"; the caller renders without a logo.

pub mod fetch;
pub mod html;
pub mod ico;
pub mod url;

pub use fetch::FaviconFetcher;
pub use url::SiteUrl;
