// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Color parsing for style options: CSS-style names and hex notation.

use crate::error::{Bw2QrError, Result};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; 4]);

/// Named colors accepted on the command line.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("navy", [0, 0, 128]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("magenta", [255, 0, 255]),
    ("cyan", [0, 255, 255]),
    ("teal", [0, 128, 128]),
    ("maroon", [128, 0, 0]),
    ("olive", [128, 128, 0]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("silver", [192, 192, 192]),
    ("darkgray", [169, 169, 169]),
    ("lightgray", [211, 211, 211]),
];

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const WHITE: Color = Color([255, 255, 255, 255]);
    pub const TRANSPARENT: Color = Color([0, 0, 0, 0]);

    /// Parse `black`, `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        let invalid = || Bw2QrError::InvalidArgument(format!("invalid color: \"{input}\""));

        if let Some(hex) = text.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
            return match hex.len() {
                3 => {
                    let mut rgb = [0u8; 3];
                    for (i, c) in hex.chars().enumerate() {
                        let v = channel(&c.to_string())?;
                        rgb[i] = v * 17;
                    }
                    Ok(Self([rgb[0], rgb[1], rgb[2], 255]))
                }
                6 | 8 => {
                    let r = channel(&hex[0..2])?;
                    let g = channel(&hex[2..4])?;
                    let b = channel(&hex[4..6])?;
                    let a = if hex.len() == 8 { channel(&hex[6..8])? } else { 255 };
                    Ok(Self([r, g, b, a]))
                }
                _ => Err(invalid()),
            };
        }

        let lower = text.to_ascii_lowercase();
        if lower == "transparent" {
            return Ok(Self::TRANSPARENT);
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, [r, g, b])| Self([*r, *g, *b, 255]))
            .ok_or_else(invalid)
    }

    pub fn rgba(&self) -> [u8; 4] {
        self.0
    }

    /// Perceived brightness (ITU-R BT.601), ignoring alpha.
    pub fn luma(&self) -> u8 {
        let [r, g, b, _] = self.0;
        ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
    }
}

impl std::str::FromStr for Color {
    type Err = Bw2QrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
