// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.
//
// Style flags are all optional so that the three layers can be told apart:
// built-in defaults, then the `--config` style file, then the flags.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use bw2qr_core::error::{Bw2QrError, Result};
use bw2qr_core::{EccLevel, OptionKey, OptionSet, PaperSize, StyleConfig};

#[derive(Debug, Parser)]
#[command(name = "bw2qr", version, about = "Turn Bitwarden favourites into printable QR codes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert a Bitwarden export into a PDF sheet of QR codes.
    Pdf(PdfArgs),
    /// Convert a Bitwarden export into one PNG file per login.
    Png(PngArgs),
    /// Encode arbitrary text as a single PNG.
    Text(TextArgs),
}

#[derive(Debug, Args)]
pub struct PdfArgs {
    /// Path to the Bitwarden JSON export.
    #[arg(short, long)]
    pub json: PathBuf,
    /// Path to the PDF output file.
    #[arg(short, long)]
    pub pdf: PathBuf,
    /// QR codes per row.
    #[arg(long, default_value_t = 3)]
    pub columns: usize,
    /// Rows of QR codes per page.
    #[arg(long, default_value_t = 4)]
    pub rows: usize,
    /// a4, a3, a5, letter, legal, tabloid or <width>x<height> in mm.
    #[arg(long, default_value = "a4")]
    pub paper: PaperSize,
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct PngArgs {
    /// Path to the Bitwarden JSON export.
    #[arg(short, long)]
    pub json: PathBuf,
    /// Directory receiving the PNG files; created when missing.
    #[arg(long)]
    pub out_dir: PathBuf,
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct TextArgs {
    /// Text to encode.
    #[arg(short, long)]
    pub data: String,
    /// Path to the PNG output file.
    #[arg(long)]
    pub png: PathBuf,
    /// Caption printed under the code.
    #[arg(short, long, default_value = "")]
    pub title: String,
    /// Website whose icon is used as logo.
    #[arg(short, long, default_value = "")]
    pub url: String,
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Flags shared by every subcommand.
#[derive(Debug, Default, Args)]
pub struct CommonArgs {
    /// Encrypt every payload with this password (AES-256-CBC).
    #[arg(long)]
    pub password: Option<String>,
    /// Base64 IV to reuse; a random one is generated when omitted.
    #[arg(long, requires = "password")]
    pub iv: Option<String>,
    /// Worker threads; defaults to the available parallelism.
    #[arg(long)]
    pub workers: Option<NonZeroUsize>,
    /// JSON style file with kebab-case option names.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub style: StyleArgs,
}

impl CommonArgs {
    /// Resolve the style: defaults, overlaid by the style file, overlaid by flags.
    pub fn resolve_style(&self) -> Result<StyleConfig> {
        let mut options = match &self.config {
            Some(path) => OptionSet::from_json_file(path)?,
            None => OptionSet::default(),
        };
        options.merge(self.style.to_options());
        StyleConfig::from_options(&options)
    }
}

#[derive(Debug, Default, Args)]
pub struct StyleArgs {
    /// Size in pixels of each QR code module [default: 3]
    #[arg(short = 'm', long)]
    pub qrcode_module_px_size: Option<u32>,
    /// Size in pixels of the QR code border [default: 3]
    #[arg(short = 'o', long)]
    pub qrcode_border_px_size: Option<u32>,
    /// QR code module color [default: black]
    #[arg(short = 'q', long)]
    pub qrcode_module_color: Option<String>,
    /// QR code background color [default: white]
    #[arg(short = 'k', long)]
    pub qrcode_background_color: Option<String>,
    /// Error correction level: low, medium, quartile or high [default: high]
    #[arg(long)]
    pub qrcode_ecc: Option<EccLevel>,
    /// Color of the frame [default: #485778]
    #[arg(short = 'a', long)]
    pub frame_border_color: Option<String>,
    /// Size in pixels of the frame border width [default: 12]
    #[arg(short = 'w', long)]
    pub frame_border_width_size: Option<u32>,
    /// Size in pixels of the frame border height [default: 65]
    #[arg(short = 'e', long)]
    pub frame_border_height_size: Option<u32>,
    /// Size in pixels of the frame border radius [default: 15]
    #[arg(short = 'r', long)]
    pub frame_border_radius: Option<u32>,
    /// Size in pixels of the logo, 0 to disable [default: 48]
    #[arg(short = 'l', long)]
    pub frame_logo_size: Option<u32>,
    /// Font family of the QR code name, or a font file path [default: Arial-Black]
    #[arg(short = 'f', long)]
    pub frame_font_family: Option<String>,
    /// Font color of the QR code name [default: white]
    #[arg(short = 'c', long)]
    pub frame_font_color: Option<String>,
    /// Size in pixels of the QR code name font, 0 to disable [default: 28.0]
    #[arg(short = 's', long)]
    pub frame_font_size: Option<f64>,
}

impl StyleArgs {
    /// Only the flags that were given.
    pub fn to_options(&self) -> OptionSet {
        let mut options = OptionSet::default();
        let sizes = [
            (OptionKey::QrcodeModulePxSize, self.qrcode_module_px_size),
            (OptionKey::QrcodeBorderPxSize, self.qrcode_border_px_size),
            (OptionKey::FrameBorderWidthSize, self.frame_border_width_size),
            (OptionKey::FrameBorderHeightSize, self.frame_border_height_size),
            (OptionKey::FrameBorderRadius, self.frame_border_radius),
            (OptionKey::FrameLogoSize, self.frame_logo_size),
        ];
        options.extend(sizes.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))));

        let texts = [
            (OptionKey::QrcodeModuleColor, &self.qrcode_module_color),
            (OptionKey::QrcodeBackgroundColor, &self.qrcode_background_color),
            (OptionKey::FrameBorderColor, &self.frame_border_color),
            (OptionKey::FrameFontFamily, &self.frame_font_family),
            (OptionKey::FrameFontColor, &self.frame_font_color),
        ];
        options.extend(
            texts
                .into_iter()
                .filter_map(|(k, v)| v.as_deref().map(|v| (k, v))),
        );

        if let Some(size) = self.frame_font_size {
            options.set(OptionKey::FrameFontSize, size);
        }
        if let Some(ecc) = self.qrcode_ecc {
            options.set(OptionKey::QrcodeEcc, ecc);
        }
        options
    }
}

/// Fail unless `path` has the extension `ext` (without the dot).
pub fn check_extension(path: &Path, ext: &str, what: &str) -> Result<()> {
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext));
    if matches {
        Ok(())
    } else {
        Err(Bw2QrError::InvalidArgument(format!(
            "invalid {what}: \"{}\"",
            path.display()
        )))
    }
}
