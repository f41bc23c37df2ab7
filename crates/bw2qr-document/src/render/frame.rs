// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rounded rectangles for the frame and the logo badge.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

/// Fill a rectangle; zero-sized rectangles draw nothing.
fn fill_rect(canvas: &mut RgbaImage, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) {
    if width > 0 && height > 0 {
        draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(width, height), color);
    }
}

/// Fill a rectangle whose corners are rounded with `radius`.
///
/// The radius is clamped to half the shorter side.
pub fn fill_rounded_rect(
    canvas: &mut RgbaImage,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    radius: u32,
    color: Rgba<u8>,
) {
    let r = radius.min(width / 2).min(height / 2);
    if r == 0 {
        fill_rect(canvas, x, y, width, height, color);
        return;
    }

    fill_rect(canvas, x + r as i32, y, width - 2 * r, height, color);
    fill_rect(canvas, x, y + r as i32, width, height - 2 * r, color);

    let ri = r as i32;
    let left = x + ri;
    let right = x + width as i32 - 1 - ri;
    let top = y + ri;
    let bottom = y + height as i32 - 1 - ri;
    for center in [(left, top), (right, top), (left, bottom), (right, bottom)] {
        draw_filled_circle_mut(canvas, center, ri, color);
    }
}
