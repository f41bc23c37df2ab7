// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Style configuration for QR code rendering.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Bw2QrError, Result};
use crate::options::{OptionKey, OptionSet};
use crate::types::EccLevel;

/// Maximum number of characters of a record name shown under the code.
pub const MAX_TITLE_CHARS: usize = 16;

/// Side of the largest QR symbol (version 40), in modules.
pub const MAX_SYMBOL_MODULES: u32 = 177;

/// Largest width or height of a rendered image, in pixels.
pub const MAX_CANVAS_PX: u32 = 16_384;

/// How a QR code image is styled.
///
/// Serialized keys are the style option names, so a serialized style can be
/// loaded back as a `--config` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StyleConfig {
    /// Side of one QR module in pixels.
    #[serde(rename = "qrcode-module-px-size")]
    pub module_px_size: u32,
    /// Quiet border around the modules, in pixels.
    #[serde(rename = "qrcode-border-px-size")]
    pub border_px_size: u32,
    #[serde(rename = "qrcode-module-color")]
    pub module_color: String,
    #[serde(rename = "qrcode-background-color")]
    pub background_color: String,
    pub frame_border_color: String,
    /// Frame thickness on the left, right and top sides.
    pub frame_border_width_size: u32,
    /// Frame thickness at the bottom, where the caption goes.
    pub frame_border_height_size: u32,
    pub frame_border_radius: u32,
    /// Logo side in pixels; 0 disables the logo.
    pub frame_logo_size: u32,
    /// Font family name or path to a TrueType/OpenType file.
    pub frame_font_family: String,
    pub frame_font_color: String,
    /// Caption size in pixels; 0 disables the caption.
    pub frame_font_size: f64,
    #[serde(rename = "qrcode-ecc")]
    pub ecc: EccLevel,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            module_px_size: 3,
            border_px_size: 3,
            module_color: "black".into(),
            background_color: "white".into(),
            frame_border_color: "#485778".into(),
            frame_border_width_size: 12,
            frame_border_height_size: 65,
            frame_border_radius: 15,
            frame_logo_size: 48,
            frame_font_family: "Arial-Black".into(),
            frame_font_color: "white".into(),
            frame_font_size: 28.0,
            ecc: EccLevel::High,
        }
    }
}

impl StyleConfig {
    /// Build a style from an option set, taking defaults for absent keys.
    pub fn from_options(options: &OptionSet) -> Result<Self> {
        let d = Self::default();
        let style = Self {
            module_px_size: options.get(OptionKey::QrcodeModulePxSize, d.module_px_size),
            border_px_size: options.get(OptionKey::QrcodeBorderPxSize, d.border_px_size),
            module_color: options.get(OptionKey::QrcodeModuleColor, d.module_color),
            background_color: options.get(OptionKey::QrcodeBackgroundColor, d.background_color),
            frame_border_color: options.get(OptionKey::FrameBorderColor, d.frame_border_color),
            frame_border_width_size: options
                .get(OptionKey::FrameBorderWidthSize, d.frame_border_width_size),
            frame_border_height_size: options
                .get(OptionKey::FrameBorderHeightSize, d.frame_border_height_size),
            frame_border_radius: options.get(OptionKey::FrameBorderRadius, d.frame_border_radius),
            frame_logo_size: options.get(OptionKey::FrameLogoSize, d.frame_logo_size),
            frame_font_family: options.get(OptionKey::FrameFontFamily, d.frame_font_family),
            frame_font_color: options.get(OptionKey::FrameFontColor, d.frame_font_color),
            frame_font_size: options.get(OptionKey::FrameFontSize, d.frame_font_size),
            ecc: options.get(OptionKey::QrcodeEcc, d.ecc),
        };
        style.validate()?;
        Ok(style)
    }

    /// Check sizes and colors before any rendering happens.
    pub fn validate(&self) -> Result<()> {
        if self.module_px_size == 0 {
            return Err(Bw2QrError::InvalidArgument(format!(
                "{} must be at least 1",
                OptionKey::QrcodeModulePxSize
            )));
        }
        if !self.frame_font_size.is_finite() || self.frame_font_size < 0.0 {
            return Err(Bw2QrError::InvalidArgument(format!(
                "{} must be a positive number",
                OptionKey::FrameFontSize
            )));
        }
        match self.canvas_size(MAX_SYMBOL_MODULES) {
            Some((width, height)) if width <= MAX_CANVAS_PX && height <= MAX_CANVAS_PX => {}
            _ => {
                return Err(Bw2QrError::InvalidArgument(format!(
                    "{}, {}, {} and {} make images larger than {MAX_CANVAS_PX}x{MAX_CANVAS_PX} pixels",
                    OptionKey::QrcodeModulePxSize,
                    OptionKey::QrcodeBorderPxSize,
                    OptionKey::FrameBorderWidthSize,
                    OptionKey::FrameBorderHeightSize,
                )));
            }
        }
        if self.frame_logo_size > MAX_CANVAS_PX {
            return Err(Bw2QrError::InvalidArgument(format!(
                "{} must be at most {MAX_CANVAS_PX}",
                OptionKey::FrameLogoSize
            )));
        }
        if self.frame_font_size > f64::from(MAX_CANVAS_PX) {
            return Err(Bw2QrError::InvalidArgument(format!(
                "{} must be at most {MAX_CANVAS_PX}",
                OptionKey::FrameFontSize
            )));
        }
        self.palette().map(|_| ())
    }

    /// Width and height of the framed image for a symbol of `modules`
    /// modules, or `None` on `u32` overflow.
    pub fn canvas_size(&self, modules: u32) -> Option<(u32, u32)> {
        let side = modules
            .checked_mul(self.module_px_size)?
            .checked_add(self.border_px_size.checked_mul(2)?)?;
        let width = side.checked_add(self.frame_border_width_size.checked_mul(2)?)?;
        let height = side
            .checked_add(self.frame_border_width_size)?
            .checked_add(self.frame_border_height_size)?;
        Some((width, height))
    }

    /// Parse every configured color.
    pub fn palette(&self) -> Result<Palette> {
        Ok(Palette {
            module: Color::parse(&self.module_color)?,
            background: Color::parse(&self.background_color)?,
            frame: Color::parse(&self.frame_border_color)?,
            font: Color::parse(&self.frame_font_color)?,
        })
    }

    pub fn has_caption(&self, title: &str) -> bool {
        !title.is_empty() && self.frame_font_size > 0.0
    }

    pub fn has_logo(&self, url: &str) -> bool {
        !url.is_empty() && self.frame_logo_size > 0
    }
}

/// Parsed colors of a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub module: Color,
    pub background: Color,
    pub frame: Color,
    pub font: Color,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionValue;

    #[test]
    fn defaults_match_documented_cli_defaults() {
        let style = StyleConfig::default();
        assert_eq!(style.module_px_size, 3);
        assert_eq!(style.frame_border_height_size, 65);
        assert_eq!(style.frame_logo_size, 48);
        assert_eq!(style.frame_font_size, 28.0);
        assert_eq!(style.ecc, EccLevel::High);
        assert!(style.validate().is_ok());
    }

    #[test]
    fn options_override_defaults() {
        let options = OptionSet::new([
            (OptionKey::QrcodeModulePxSize, OptionValue::Size(5)),
            (OptionKey::FrameBorderColor, OptionValue::from("#000")),
            (OptionKey::QrcodeEcc, OptionValue::Ecc(EccLevel::Low)),
        ]);
        let style = StyleConfig::from_options(&options).unwrap();
        assert_eq!(style.module_px_size, 5);
        assert_eq!(style.frame_border_color, "#000");
        assert_eq!(style.ecc, EccLevel::Low);
        assert_eq!(style.border_px_size, 3);
    }

    #[test]
    fn invalid_color_is_a_config_error() {
        let options = OptionSet::new([(OptionKey::QrcodeModuleColor, "not-a-color")]);
        assert!(matches!(
            StyleConfig::from_options(&options),
            Err(Bw2QrError::InvalidArgument(_))
        ));
    }

    #[test]
    fn zero_module_size_is_rejected() {
        let options = OptionSet::new([(OptionKey::QrcodeModulePxSize, 0u32)]);
        assert!(StyleConfig::from_options(&options).is_err());
    }

    #[test]
    fn oversized_pixel_sizes_are_config_errors() {
        for (key, size) in [
            (OptionKey::QrcodeModulePxSize, 40_000_000u32),
            (OptionKey::QrcodeBorderPxSize, u32::MAX),
            (OptionKey::FrameBorderWidthSize, u32::MAX / 2 + 1),
            (OptionKey::FrameBorderHeightSize, MAX_CANVAS_PX),
            (OptionKey::FrameLogoSize, MAX_CANVAS_PX + 1),
        ] {
            let options = OptionSet::new([(key, size)]);
            assert!(
                matches!(
                    StyleConfig::from_options(&options),
                    Err(Bw2QrError::InvalidArgument(_))
                ),
                "{key} = {size}"
            );
        }
        let options = OptionSet::new([(OptionKey::FrameFontSize, 1e9)]);
        assert!(StyleConfig::from_options(&options).is_err());
    }

    #[test]
    fn largest_accepted_style_fits_the_canvas() {
        let style = StyleConfig {
            module_px_size: 90,
            ..StyleConfig::default()
        };
        assert!(style.validate().is_ok());
        let (width, height) = style.canvas_size(MAX_SYMBOL_MODULES).unwrap();
        assert!(width <= MAX_CANVAS_PX && height <= MAX_CANVAS_PX);

        let style = StyleConfig {
            module_px_size: 93,
            ..StyleConfig::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn canvas_size_reports_overflow() {
        let style = StyleConfig {
            module_px_size: 40_000_000,
            ..StyleConfig::default()
        };
        assert_eq!(style.canvas_size(MAX_SYMBOL_MODULES), None);
        assert_eq!(StyleConfig::default().canvas_size(21), Some((93, 146)));
    }

    #[test]
    fn caption_and_logo_gates() {
        let mut style = StyleConfig::default();
        assert!(style.has_caption("Example"));
        assert!(!style.has_caption(""));
        assert!(style.has_logo("github.com"));
        style.frame_logo_size = 0;
        assert!(!style.has_logo("github.com"));
        style.frame_font_size = 0.0;
        assert!(!style.has_caption("Example"));
    }

    #[test]
    fn serde_uses_option_names() {
        let json = serde_json::to_value(StyleConfig::default()).unwrap();
        assert_eq!(json["frame-border-color"], "#485778");
        assert_eq!(json["qrcode-module-px-size"], 3);
        let style: StyleConfig =
            serde_json::from_str(r#"{ "qrcode-module-px-size": 6 }"#).unwrap();
        assert_eq!(style.module_px_size, 6);
        assert_eq!(style.frame_logo_size, 48);
    }

    #[test]
    fn serialized_style_loads_as_a_style_file() {
        let style = StyleConfig {
            module_px_size: 5,
            frame_border_color: "#102030".into(),
            frame_font_size: 20.0,
            ecc: EccLevel::Quartile,
            ..StyleConfig::default()
        };
        let json = serde_json::to_value(&style).unwrap();
        let options = OptionSet::from_json(&json).unwrap();
        assert_eq!(StyleConfig::from_options(&options).unwrap(), style);
    }
}
