// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bw2qr — Core types, options and error definitions shared across all crates.

pub mod color;
pub mod config;
pub mod error;
pub mod import;
pub mod options;
pub mod traits;
pub mod types;

pub use color::Color;
pub use config::{Palette, StyleConfig};
pub use error::{Bw2QrError, ErrorScope};
pub use options::{OptionKey, OptionSet, OptionValue};
pub use traits::{IconSource, NoIcons};
pub use types::*;
