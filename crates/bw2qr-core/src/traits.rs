// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator seams used by the conversion pipeline.

/// Source of website icons for the logo badge.
///
/// Implementations never fail: any problem (network, parsing, missing
/// icon) is reported as `None` and the code is rendered without a logo.
pub trait IconSource: Send + Sync {
    /// Return encoded image bytes for the icon of `url`, ideally
    /// `target_size` pixels wide.
    fn fetch_best_icon(&self, url: &str, target_size: u32) -> Option<Vec<u8>>;
}

/// An icon source that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcons;

impl IconSource for NoIcons {
    fn fetch_best_icon(&self, _url: &str, _target_size: u32) -> Option<Vec<u8>> {
        None
    }
}

impl<T: IconSource + ?Sized> IconSource for &T {
    fn fetch_best_icon(&self, url: &str, target_size: u32) -> Option<Vec<u8>> {
        (**self).fetch_best_icon(url, target_size)
    }
}

impl<T: IconSource + ?Sized> IconSource for std::sync::Arc<T> {
    fn fetch_best_icon(&self, url: &str, target_size: u32) -> Option<Vec<u8>> {
        (**self).fetch_best_icon(url, target_size)
    }
}
