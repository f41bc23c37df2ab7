// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render module — styled rasterisation of QR symbols.

pub mod caption;
pub mod context;
pub mod frame;
pub mod renderer;

pub use context::ImagingContext;
pub use renderer::{Layout, StyleRenderer};
