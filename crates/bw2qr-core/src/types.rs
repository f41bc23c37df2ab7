// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for bw2qr.

use serde::{Deserialize, Serialize};

use crate::error::{Bw2QrError, Result};

/// A custom field attached to a login record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    pub value: String,
}

/// One login extracted from a password-manager export.
///
/// Custom field names are unique; they keep the order in which they were
/// first set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub username: String,
    pub password: String,
    pub totp: String,
    pub url: String,
    fields: Vec<CustomField>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_login(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        totp: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self.totp = totp.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Set a custom field. An existing field with the same name keeps its
    /// position and gets the new value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(CustomField { name, value }),
        }
    }

    pub fn fields(&self) -> &[CustomField] {
        &self.fields
    }
}

/// QR error-correction level, ordered by redundancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EccLevel {
    /// ~7% recovery.
    Low,
    /// ~15% recovery.
    Medium,
    /// ~25% recovery.
    Quartile,
    /// ~30% recovery.
    High,
}

impl EccLevel {
    pub const ALL: [EccLevel; 4] = [Self::Low, Self::Medium, Self::Quartile, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::Quartile => "quartile",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for EccLevel {
    type Err = Bw2QrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(Self::Low),
            "m" | "medium" => Ok(Self::Medium),
            "q" | "quartile" => Ok(Self::Quartile),
            "h" | "high" => Ok(Self::High),
            other => Err(Bw2QrError::InvalidArgument(format!(
                "unknown error correction level: \"{other}\""
            ))),
        }
    }
}

impl std::fmt::Display for EccLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Tabloid => (279, 432),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

impl std::str::FromStr for PaperSize {
    type Err = Bw2QrError;

    /// Accepts the named sizes or `<width>x<height>` in millimetres.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(Self::A4),
            "a3" => Ok(Self::A3),
            "a5" => Ok(Self::A5),
            "letter" => Ok(Self::Letter),
            "legal" => Ok(Self::Legal),
            "tabloid" => Ok(Self::Tabloid),
            other => {
                let invalid =
                    || Bw2QrError::InvalidArgument(format!("unknown paper size: \"{other}\""));
                let (w, h) = other.split_once('x').ok_or_else(invalid)?;
                let width_mm: u32 = w.trim().parse().map_err(|_| invalid())?;
                let height_mm: u32 = h.trim().parse().map_err(|_| invalid())?;
                if width_mm == 0 || height_mm == 0 {
                    return Err(invalid());
                }
                Ok(Self::Custom {
                    width_mm,
                    height_mm,
                })
            }
        }
    }
}

/// Encoding of a rendered raster buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RasterFormat {
    Png,
}

impl RasterFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
        }
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A fully composed QR code image, encoded and ready for layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub format: RasterFormat,
    /// Encoded raster bytes in `format`.
    pub data: Vec<u8>,
    /// Area covered by the module raster plus its quiet border.
    pub symbol_area: PixelRect,
    /// Size in pixels of one QR module.
    pub module_px: u32,
    /// Whether the logo badge is part of this image.
    pub has_logo: bool,
}

/// Lifecycle states of a batch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting in the shared queue.
    Queued,
    /// Claimed by exactly one worker.
    InProgress,
    /// Finished with an accepted image.
    Succeeded,
    /// Finished with a recorded failure.
    Failed,
}

impl JobStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}
