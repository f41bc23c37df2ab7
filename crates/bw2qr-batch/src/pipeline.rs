// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion pipeline — payload, symbol, styled image, read-back check.
//
// A logo can hide modules the error correction cannot recover. The image
// with the logo is tried first; when it does not read back, the same
// symbol is rendered without the logo. No image leaves the pipeline
// without passing verification.

use image::DynamicImage;
use tracing::{debug, info, instrument, warn};

use bw2qr_core::error::{Bw2QrError, Result};
use bw2qr_core::{IconSource, Record, RenderedImage, StyleConfig};
use bw2qr_document::{ImageProcessor, Payload, PayloadEncoder, QrSymbol, StyleRenderer, Verifier};

/// Converts records (or raw text) into verified QR code images.
#[derive(Debug)]
pub struct QrConverter<I> {
    encoder: PayloadEncoder,
    renderer: StyleRenderer,
    verifier: Verifier,
    icons: I,
}

impl<I: IconSource> QrConverter<I> {
    pub fn new(style: StyleConfig, encoder: PayloadEncoder, icons: I) -> Result<Self> {
        Ok(Self {
            encoder,
            renderer: StyleRenderer::new(style)?,
            verifier: Verifier::new(),
            icons,
        })
    }

    pub fn style(&self) -> &StyleConfig {
        self.renderer.style()
    }

    pub fn encoder(&self) -> &PayloadEncoder {
        &self.encoder
    }

    /// Convert one record; its name is the caption and its URL the logo source.
    #[instrument(skip_all, fields(name = %record.name))]
    pub fn convert_record(&self, record: &Record) -> Result<RenderedImage> {
        let payload = self.encoder.encode_record(record)?;
        self.convert_payload(&record.name, &payload, &record.name, &record.url)
    }

    /// Convert caller-supplied text, e.g. for a stand-alone QR code.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub fn convert_text(&self, text: &str, title: &str, url: &str) -> Result<RenderedImage> {
        let name = if title.is_empty() { "text" } else { title };
        let payload = self.encoder.encode_text(name, text)?;
        self.convert_payload(name, &payload, title, url)
    }

    fn convert_payload(
        &self,
        name: &str,
        payload: &Payload,
        title: &str,
        url: &str,
    ) -> Result<RenderedImage> {
        let symbol = QrSymbol::generate(payload.as_bytes(), self.style().ecc).map_err(|err| {
            match err {
                Bw2QrError::PayloadTooLarge { size, max, .. } => Bw2QrError::PayloadTooLarge {
                    name: name.to_owned(),
                    size,
                    max,
                },
                other => other,
            }
        })?;

        if let Some(logo) = self.logo(url) {
            let image = self.renderer.render(&symbol, title, Some(&logo))?;
            if self.verifier.verify(&image, payload.as_str()) {
                debug!(name, "verified with logo");
                return Ok(image);
            }
            warn!(name, "logo hides too much of the code, rendering without it");
        }

        let image = self.renderer.render(&symbol, title, None)?;
        if self.verifier.verify(&image, payload.as_str()) {
            info!(name, version = symbol.version(), "qr code verified");
            Ok(image)
        } else {
            Err(Bw2QrError::DecodeVerificationFailed(name.to_owned()))
        }
    }

    /// The decoded icon for `url`, when the style asks for one and it can be found.
    fn logo(&self, url: &str) -> Option<DynamicImage> {
        if !self.style().has_logo(url) {
            return None;
        }
        let bytes = self
            .icons
            .fetch_best_icon(url, self.style().frame_logo_size)?;
        match ImageProcessor::from_bytes(&bytes) {
            Ok(icon) => Some(icon.into_dynamic()),
            Err(err) => {
                warn!(url, %err, "icon ignored");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bw2qr_core::NoIcons;
    use bw2qr_document::payload::MAX_PAYLOAD_BYTES;
    use bw2qr_security::PayloadCipher;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Icon source that always returns a solid square and counts requests.
    #[derive(Debug, Default)]
    pub(crate) struct SolidIcon {
        pub(crate) requests: AtomicUsize,
    }

    impl IconSource for SolidIcon {
        fn fetch_best_icon(&self, _url: &str, target_size: u32) -> Option<Vec<u8>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let img = image::RgbaImage::from_pixel(
                target_size.max(1),
                target_size.max(1),
                image::Rgba([200, 40, 40, 255]),
            );
            ImageProcessor::from_rgba(img).to_png_bytes().ok()
        }
    }

    pub(crate) fn style() -> StyleConfig {
        StyleConfig {
            frame_font_size: 0.0,
            ..StyleConfig::default()
        }
    }

    fn example() -> Record {
        Record::new("Example").with_login("u", "p", "")
    }

    fn reads_back(image: &RenderedImage, payload: &Payload) -> bool {
        Verifier::new().verify(image, payload.as_str())
    }

    #[test]
    fn concrete_example_converts() {
        let converter = QrConverter::new(style(), PayloadEncoder::new(), NoIcons).unwrap();
        let image = converter.convert_record(&example()).unwrap();
        assert!(!image.has_logo);
        let payload = converter.encoder().encode_record(&example()).unwrap();
        assert_eq!(payload.len(), MAX_PAYLOAD_BYTES);
        assert!(reads_back(&image, &payload));
    }

    #[test]
    fn small_logo_is_kept() {
        let icons = SolidIcon::default();
        let converter = QrConverter::new(style(), PayloadEncoder::new(), icons).unwrap();
        let record = example().with_url("https://example.org");
        let image = converter.convert_record(&record).unwrap();
        assert!(image.has_logo);
        assert_eq!(converter.icons.requests.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn oversized_logo_falls_back_to_plain_image() {
        let style = StyleConfig {
            frame_logo_size: 300,
            ..style()
        };
        let converter = QrConverter::new(style, PayloadEncoder::new(), SolidIcon::default()).unwrap();
        let record = example().with_url("https://example.org");
        let image = converter.convert_record(&record).unwrap();
        assert!(!image.has_logo);
        let payload = converter.encoder().encode_record(&record).unwrap();
        assert!(reads_back(&image, &payload));
    }

    #[test]
    fn no_url_means_no_icon_request() {
        let converter = QrConverter::new(style(), PayloadEncoder::new(), SolidIcon::default()).unwrap();
        converter.convert_record(&example()).unwrap();
        assert_eq!(converter.icons.requests.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn oversized_record_never_reaches_the_renderer() {
        let converter = QrConverter::new(style(), PayloadEncoder::new(), NoIcons).unwrap();
        let record = example().with_field("notes", "n".repeat(1000));
        assert!(matches!(
            converter.convert_record(&record),
            Err(Bw2QrError::PayloadTooLarge { name, .. }) if name == "Example"
        ));
    }

    #[test]
    fn encrypted_records_decode_to_ciphertext() {
        let cipher = PayloadCipher::new("hunter2", None).unwrap();
        let converter =
            QrConverter::new(style(), PayloadEncoder::encrypted(cipher.clone()), NoIcons).unwrap();
        let image = converter.convert_record(&example()).unwrap();

        let payload = converter.encoder().encode_record(&example()).unwrap();
        assert_eq!(payload.len(), 492);
        assert!(reads_back(&image, &payload));
        let plaintext = cipher.decrypt_base64(payload.as_str()).unwrap();
        assert!(String::from_utf8(plaintext).unwrap().contains("\"username\": \"u\""));
    }

    #[test]
    fn text_mode_uses_title_as_name() {
        let converter = QrConverter::new(style(), PayloadEncoder::new(), NoIcons).unwrap();
        let image = converter.convert_text("hello world", "Greeting", "").unwrap();
        let payload = converter.encoder().encode_text("Greeting", "hello world").unwrap();
        assert!(payload.as_str().starts_with("hello world "));
        assert!(reads_back(&image, &payload));
        assert!(matches!(
            converter.convert_text(&"x".repeat(600), "", ""),
            Err(Bw2QrError::PayloadTooLarge { name, .. }) if name == "text"
        ));
    }
}
