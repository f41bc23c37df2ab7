// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bw2qr-document — from record to printable page.
//
// Provides the fixed-size payload encoder, QR symbol generation, the styled
// renderer (module raster, rounded frame, logo badge, caption), the
// independent verification decoder, image helpers, and the PDF grid writer.

pub mod image;
pub mod payload;
pub mod pdf;
pub mod qr;
pub mod render;

// Re-export the primary structs so callers can use `bw2qr_document::StyleRenderer` etc.
pub use image::processor::ImageProcessor;
pub use payload::{Payload, PayloadEncoder};
pub use pdf::writer::PdfWriter;
pub use qr::symbol::QrSymbol;
pub use qr::verify::Verifier;
pub use render::renderer::StyleRenderer;
