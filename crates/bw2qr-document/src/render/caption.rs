// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Caption fitting and drawing.

use ab_glyph::{Font, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use bw2qr_core::PixelRect;
use bw2qr_core::config::MAX_TITLE_CHARS;

/// Truncate `title` to `MAX_TITLE_CHARS`, then drop trailing characters
/// until it is at most `max_width` pixels wide.
///
/// `measure` returns the rendered width of a candidate string.
pub fn fit_title(title: &str, max_width: u32, measure: impl Fn(&str) -> u32) -> String {
    let mut text: String = title.chars().take(MAX_TITLE_CHARS).collect();
    while !text.is_empty() && measure(&text) > max_width {
        text.pop();
    }
    text
}

/// Draw `text` centred inside `band`.
pub fn draw_caption(
    canvas: &mut RgbaImage,
    font: &impl Font,
    size: f32,
    color: Rgba<u8>,
    text: &str,
    band: PixelRect,
) {
    if text.is_empty() {
        return;
    }
    let scale = PxScale::from(size);
    let (width, height) = text_size(scale, font, text);
    let x = band.x as i32 + (band.width as i32 - width as i32) / 2;
    let y = band.y as i32 + (band.height as i32 - height as i32) / 2;
    draw_text_mut(canvas, color, x, y, scale, font, text);
}
