// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, resize, crop, pad and flatten in-memory images
// using the `image` crate, and encode them back to PNG.

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::{debug, instrument};

use bw2qr_core::error::{Bw2QrError, Result};

/// Chainable wrapper around one decoded image; transformations consume
/// `self`.
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    /// Create a processor from raw encoded bytes (PNG, ICO, JPEG, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data)
            .map_err(|err| Bw2QrError::ImageError(format!("failed to decode image: {err}")))?;
        debug!(width = image.width(), height = image.height(), "decoded");
        Ok(Self { image })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Wrap an RGBA buffer.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.image.into_rgba8()
    }

    /// Scale (up or down) to fit `max_width` x `max_height`, keeping the
    /// aspect ratio.
    pub fn resize(self, max_width: u32, max_height: u32) -> Self {
        Self {
            image: self
                .image
                .resize(max_width, max_height, FilterType::Lanczos3),
        }
    }

    /// Keep the given rectangle, clamped to the image bounds.
    pub fn crop(self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let (w, h) = (self.image.width(), self.image.height());
        let x = x.min(w.saturating_sub(1));
        let y = y.min(h.saturating_sub(1));
        Self {
            image: self
                .image
                .crop_imm(x, y, width.min(w - x), height.min(h - y)),
        }
    }

    /// Surround the image with a `border` pixel wide band of `color`.
    pub fn pad(self, border: u32, color: Rgba<u8>) -> Self {
        let rgba = self.image.to_rgba8();
        let mut canvas = RgbaImage::from_pixel(
            rgba.width() + 2 * border,
            rgba.height() + 2 * border,
            color,
        );
        imageops::replace(&mut canvas, &rgba, i64::from(border), i64::from(border));
        Self::from_rgba(canvas)
    }

    /// Composite the image over an opaque `background`, removing transparency.
    pub fn flatten(self, background: Rgba<u8>) -> Self {
        let rgba = self.image.to_rgba8();
        let mut canvas = RgbaImage::from_pixel(rgba.width(), rgba.height(), background);
        imageops::overlay(&mut canvas, &rgba, 0, 0);
        Self::from_rgba(canvas)
    }

    /// Encode the current image as PNG.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        self.image
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|err| Bw2QrError::ImageError(format!("png encoding failed: {err}")))?;
        Ok(png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn png_round_trip_keeps_size() {
        let png = ImageProcessor::from_rgba(RgbaImage::from_pixel(7, 5, RED))
            .to_png_bytes()
            .unwrap();
        let decoded = ImageProcessor::from_bytes(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 5));
    }

    #[test]
    fn pad_adds_border_on_every_side() {
        let padded = ImageProcessor::from_rgba(RgbaImage::from_pixel(4, 4, RED))
            .pad(3, WHITE)
            .into_rgba();
        assert_eq!(padded.dimensions(), (10, 10));
        assert_eq!(*padded.get_pixel(0, 0), WHITE);
        assert_eq!(*padded.get_pixel(3, 3), RED);
        assert_eq!(*padded.get_pixel(6, 6), RED);
        assert_eq!(*padded.get_pixel(7, 7), WHITE);
    }

    #[test]
    fn flatten_removes_transparency() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        img.put_pixel(1, 0, RED);
        let flat = ImageProcessor::from_rgba(img).flatten(WHITE).into_rgba();
        assert_eq!(*flat.get_pixel(0, 0), WHITE);
        assert_eq!(*flat.get_pixel(1, 0), RED);
    }

    #[test]
    fn crop_is_clamped_to_bounds() {
        let cropped = ImageProcessor::from_rgba(RgbaImage::from_pixel(10, 10, RED)).crop(8, 8, 5, 5);
        assert_eq!((cropped.width(), cropped.height()), (2, 2));
    }

    #[test]
    fn resize_preserves_aspect_ratio() {
        let resized = ImageProcessor::from_rgba(RgbaImage::from_pixel(64, 32, RED)).resize(16, 16);
        assert_eq!((resized.width(), resized.height()), (16, 8));
        let grown = ImageProcessor::from_rgba(RgbaImage::from_pixel(8, 4, RED)).resize(32, 32);
        assert_eq!((grown.width(), grown.height()), (32, 16));
    }

    #[test]
    fn invalid_bytes_are_an_image_error() {
        assert!(matches!(
            ImageProcessor::from_bytes(b"nope"),
            Err(Bw2QrError::ImageError(_))
        ));
    }
}
