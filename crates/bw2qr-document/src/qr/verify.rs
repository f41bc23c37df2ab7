// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Verification decoder — reads a rendered image back with `rqrr`, an
// implementation independent from the encoder, and compares the text.

use image::{GrayImage, Luma};
use tracing::{debug, instrument, warn};

use bw2qr_core::RenderedImage;
use bw2qr_core::error::Result;
use bw2qr_security::fingerprint;

use crate::image::processor::ImageProcessor;

/// Quiet zone added around the cropped symbol on the second pass, in modules.
const QUIET_ZONE_MODULES: u32 = 4;

/// Decodes rendered QR code images.
///
/// The full composition is tried first, then the symbol area cropped out
/// with a fresh quiet zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier;

impl Verifier {
    pub fn new() -> Self {
        Self
    }

    /// Whether `image` decodes to exactly `expected`.
    #[instrument(skip_all, fields(width = image.width, height = image.height, has_logo = image.has_logo))]
    pub fn verify(&self, image: &RenderedImage, expected: &str) -> bool {
        match self.decode_matching(image, expected) {
            Ok(found) => found,
            Err(err) => {
                warn!(%err, "rendered image could not be read back");
                false
            }
        }
    }

    /// All texts found in the full composition.
    pub fn decode(&self, image: &RenderedImage) -> Result<Vec<String>> {
        let gray = luma_on_white(&image.data)?;
        Ok(decode_gray(&gray))
    }

    fn decode_matching(&self, image: &RenderedImage, expected: &str) -> Result<bool> {
        let gray = luma_on_white(&image.data)?;
        if matches(&decode_gray(&gray), expected) {
            return Ok(true);
        }
        let area = image.symbol_area;
        let quiet = QUIET_ZONE_MODULES * image.module_px.max(1);
        let cropped = ImageProcessor::from_dynamic(gray.into())
            .crop(area.x, area.y, area.width, area.height)
            .pad(quiet, image::Rgba([255, 255, 255, 255]))
            .into_dynamic()
            .to_luma8();
        debug!(
            width = cropped.width(),
            height = cropped.height(),
            "retrying on the cropped symbol"
        );
        Ok(matches(&decode_gray(&cropped), expected))
    }
}

fn matches(decoded: &[String], expected: &str) -> bool {
    let found = decoded.iter().any(|text| text == expected);
    if !found {
        for text in decoded {
            debug!(
                decoded = %fingerprint(text.as_bytes()),
                expected = %fingerprint(expected.as_bytes()),
                "decoded text does not match"
            );
        }
    }
    found
}

/// Decode the PNG and flatten any transparency onto white.
fn luma_on_white(png: &[u8]) -> Result<GrayImage> {
    let flat = ImageProcessor::from_bytes(png)?
        .flatten(image::Rgba([255, 255, 255, 255]))
        .into_dynamic();
    Ok(flat.to_luma8())
}

fn decode_gray(gray: &GrayImage) -> Vec<String> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        gray.width() as usize,
        gray.height() as usize,
        |x, y| {
            let Luma([value]) = *gray.get_pixel(x as u32, y as u32);
            value
        },
    );
    let grids = prepared.detect_grids();
    debug!(grids = grids.len(), "qr grids detected");
    grids
        .into_iter()
        .filter_map(|grid| match grid.decode() {
            Ok((_meta, text)) => Some(text),
            Err(err) => {
                debug!(%err, "grid could not be decoded");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::symbol::QrSymbol;
    use crate::render::renderer::StyleRenderer;
    use bw2qr_core::{EccLevel, StyleConfig};

    fn plain_style() -> StyleConfig {
        StyleConfig {
            frame_font_size: 0.0,
            ..StyleConfig::default()
        }
    }

    fn render(text: &str, ecc: EccLevel) -> RenderedImage {
        let symbol = QrSymbol::generate(text.as_bytes(), ecc).unwrap();
        StyleRenderer::new(plain_style())
            .unwrap()
            .render(&symbol, "", None)
            .unwrap()
    }

    #[test]
    fn rendered_symbol_reads_back() {
        let text = format!("{:<510}", "{ \"login\": {} }");
        for ecc in EccLevel::ALL {
            let image = render(&text, ecc);
            assert!(Verifier::new().verify(&image, &text), "ecc {ecc}");
        }
    }

    #[test]
    fn mismatching_text_is_rejected() {
        let image = render("alpha", EccLevel::High);
        assert!(Verifier::new().verify(&image, "alpha"));
        assert!(!Verifier::new().verify(&image, "beta"));
    }

    #[test]
    fn blank_image_has_nothing_to_decode() {
        let mut image = render("alpha", EccLevel::High);
        image.data = ImageProcessor::from_dynamic(image::DynamicImage::new_rgba8(64, 64))
            .to_png_bytes()
            .unwrap();
        assert!(Verifier::new().decode(&image).unwrap().is_empty());
        assert!(!Verifier::new().verify(&image, "alpha"));
    }

    #[test]
    fn garbage_bytes_do_not_verify() {
        let mut image = render("alpha", EccLevel::High);
        image.data = b"not a png".to_vec();
        assert!(!Verifier::new().verify(&image, "alpha"));
        assert!(Verifier::new().decode(&image).is_err());
    }
}
