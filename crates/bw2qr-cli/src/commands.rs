// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand drivers. Each phase runs inside a status step; the first
// failing phase ends the run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use bw2qr_batch::{BatchOrchestrator, QrConverter};
use bw2qr_core::error::{Bw2QrError, Result};
use bw2qr_core::{IconSource, NoIcons, Record, RenderedImage, StyleConfig, import};
use bw2qr_document::{PayloadEncoder, PdfWriter};
use bw2qr_favicon::FaviconFetcher;
use bw2qr_security::PayloadCipher;

use crate::args::{CommonArgs, Command, PdfArgs, PngArgs, TextArgs, check_extension};
use crate::status::step;

type Converter = QrConverter<Arc<dyn IconSource>>;

pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Pdf(args) => pdf(args),
        Command::Png(args) => png(args),
        Command::Text(args) => text(args),
    }
}

fn pdf(args: PdfArgs) -> Result<()> {
    let converter = step("check arguments", || {
        check_export(&args.json)?;
        check_extension(&args.pdf, "pdf", "output filename")?;
        if args.columns == 0 || args.rows == 0 {
            return Err(Bw2QrError::InvalidArgument(format!(
                "page grid must be at least 1x1, got {}x{}",
                args.columns, args.rows
            )));
        }
        converter(&args.common)
    })?;
    let records = step("parse bitwarden json file", || import::parse_file(&args.json))?;
    let iv = converter.encoder().cipher().map(|c| c.iv_base64().to_owned());
    let images = step("generate all qrcodes", || convert_all(converter, &records, &args.common))?;

    step("write pdf file", || {
        let mut writer = PdfWriter::new(args.paper);
        if let Some(stem) = args.pdf.file_stem().and_then(|s| s.to_str()) {
            writer.set_title(stem);
        }
        if let Some(iv) = &iv {
            writer.set_header(format!("IV: {iv}"));
        }
        let images: Vec<RenderedImage> = images.into_iter().map(|(_, image)| image).collect();
        writer.write_to_file(&images, args.columns, args.rows, &args.pdf)
    })?;
    print_iv(iv.as_deref());
    Ok(())
}

fn png(args: PngArgs) -> Result<()> {
    let converter = step("check arguments", || {
        check_export(&args.json)?;
        converter(&args.common)
    })?;
    let records = step("parse bitwarden json file", || import::parse_file(&args.json))?;
    let iv = converter.encoder().cipher().map(|c| c.iv_base64().to_owned());
    let images = step("generate all qrcodes", || convert_all(converter, &records, &args.common))?;

    step("write png files", || {
        std::fs::create_dir_all(&args.out_dir)?;
        for (path, image) in png_paths(&args.out_dir, &images) {
            std::fs::write(&path, &image.data)?;
            info!(path = %path.display(), "Wrote PNG");
        }
        Ok(())
    })?;
    print_iv(iv.as_deref());
    Ok(())
}

fn text(args: TextArgs) -> Result<()> {
    let converter = step("check arguments", || {
        check_extension(&args.png, "png", "output filename")?;
        converter(&args.common)
    })?;
    let iv = converter.encoder().cipher().map(|c| c.iv_base64().to_owned());
    let image = step("generate qrcode", || {
        converter.convert_text(&args.data, &args.title, &args.url)
    })?;
    step("write png file", || Ok(std::fs::write(&args.png, &image.data)?))?;
    print_iv(iv.as_deref());
    Ok(())
}

fn check_export(path: &Path) -> Result<()> {
    check_extension(path, "json", "bitwarden json file")?;
    if !path.is_file() {
        return Err(Bw2QrError::InvalidArgument(format!(
            "invalid bitwarden json file: \"{}\"",
            path.display()
        )));
    }
    Ok(())
}

/// Build the converter for the resolved style and optional password.
fn converter(common: &CommonArgs) -> Result<Converter> {
    let style = common.resolve_style()?;
    let encoder = match &common.password {
        Some(password) => {
            PayloadEncoder::encrypted(PayloadCipher::new(password, common.iv.as_deref())?)
        }
        None => PayloadEncoder::new(),
    };
    QrConverter::new(style.clone(), encoder, icon_source(&style))
}

fn icon_source(style: &StyleConfig) -> Arc<dyn IconSource> {
    if style.frame_logo_size == 0 {
        Arc::new(NoIcons)
    } else {
        Arc::new(FaviconFetcher::new())
    }
}

fn convert_all(
    converter: Converter,
    records: &[Record],
    common: &CommonArgs,
) -> Result<Vec<(String, RenderedImage)>> {
    BatchOrchestrator::new(converter)
        .with_workers(common.workers)
        .run(records)
        .into_result()
}

fn print_iv(iv: Option<&str>) {
    if let Some(iv) = iv {
        println!("iv: {iv}");
    }
}

/// Output path for every image, `<dir>/<sanitized key>.png`, unique per run.
fn png_paths<'a>(
    dir: &Path,
    images: &'a [(String, RenderedImage)],
) -> Vec<(PathBuf, &'a RenderedImage)> {
    let mut used = HashSet::new();
    images
        .iter()
        .map(|(key, image)| {
            let stem = sanitize_file_stem(key);
            let mut candidate = stem.clone();
            let mut n = 2;
            while !used.insert(candidate.to_lowercase()) {
                candidate = format!("{stem}-{n}");
                n += 1;
            }
            (dir.join(format!("{candidate}.{}", image.format.extension())), image)
        })
        .collect()
}

fn sanitize_file_stem(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "qrcode".to_owned()
    } else {
        trimmed.to_owned()
    }
}
