// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QR symbol generation on top of the `qrcode` crate.
//
// The payload is always pushed as one byte-mode segment. Automatic
// segmentation would switch modes inside the space padding and make the
// version depend on content; a single segment makes it depend on length
// only.

use qrcode::bits::Bits;
use qrcode::{Color as ModuleColor, EcLevel, QrCode, Version};
use tracing::{debug, instrument};

use bw2qr_core::EccLevel;
use bw2qr_core::error::{Bw2QrError, Result};

/// Highest normal QR version.
const MAX_VERSION: i16 = 40;

fn ec_level(ecc: EccLevel) -> EcLevel {
    match ecc {
        EccLevel::Low => EcLevel::L,
        EccLevel::Medium => EcLevel::M,
        EccLevel::Quartile => EcLevel::Q,
        EccLevel::High => EcLevel::H,
    }
}

/// A generated QR code: a square matrix of dark/light modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrSymbol {
    size: usize,
    version: i16,
    ecc: EccLevel,
    /// Row-major, `true` for a dark module.
    modules: Vec<bool>,
}

impl QrSymbol {
    /// Encode `payload` at the smallest version that holds it at `ecc`.
    #[instrument(skip(payload), fields(payload_len = payload.len()))]
    pub fn generate(payload: &[u8], ecc: EccLevel) -> Result<Self> {
        let level = ec_level(ecc);
        for version in 1..=MAX_VERSION {
            if let Some(code) = encode_at(payload, Version::Normal(version), level) {
                let symbol = Self::from_code(&code, version, ecc);
                debug!(version, size = symbol.size, %ecc, "qr symbol generated");
                return Ok(symbol);
            }
        }
        Err(Bw2QrError::PayloadTooLarge {
            name: "qr symbol".into(),
            size: payload.len(),
            max: Self::capacity(ecc),
        })
    }

    /// Byte-mode capacity of the largest version at `ecc`.
    pub fn capacity(ecc: EccLevel) -> usize {
        let level = ec_level(ecc);
        let (mut low, mut high) = (0usize, 4096usize);
        while low < high {
            let mid = (low + high).div_ceil(2);
            if encode_at(&vec![0u8; mid], Version::Normal(MAX_VERSION), level).is_some() {
                low = mid;
            } else {
                high = mid - 1;
            }
        }
        low
    }

    fn from_code(code: &QrCode, version: i16, ecc: EccLevel) -> Self {
        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == ModuleColor::Dark)
            .collect();
        Self {
            size: code.width(),
            version,
            ecc,
            modules,
        }
    }

    /// Side of the module matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn version(&self) -> i16 {
        self.version
    }

    pub fn ecc(&self) -> EccLevel {
        self.ecc
    }

    /// Whether the module at column `x`, row `y` is dark.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.modules[y * self.size + x]
    }
}

fn encode_at(payload: &[u8], version: Version, level: EcLevel) -> Option<QrCode> {
    let mut bits = Bits::new(version);
    bits.push_byte_data(payload).ok()?;
    bits.push_terminator(level).ok()?;
    QrCode::with_bits(bits, level).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_payload_uses_version_24_at_high() {
        let symbol = QrSymbol::generate(&[b' '; 510], EccLevel::High).unwrap();
        assert_eq!(symbol.version(), 24);
        assert_eq!(symbol.size(), 113);
        assert_eq!(symbol.ecc(), EccLevel::High);
    }

    #[test]
    fn encrypted_payload_uses_the_same_version() {
        let symbol = QrSymbol::generate(&[b'A'; 492], EccLevel::High).unwrap();
        assert_eq!(symbol.version(), 24);
    }

    #[test]
    fn version_depends_on_length_only() {
        let spaces = QrSymbol::generate(&[b' '; 200], EccLevel::Medium).unwrap();
        let digits = QrSymbol::generate(&[b'7'; 200], EccLevel::Medium).unwrap();
        assert_eq!(spaces.version(), digits.version());
    }

    #[test]
    fn higher_ecc_needs_a_larger_symbol() {
        let payload = [b'x'; 300];
        let sizes: Vec<usize> = EccLevel::ALL
            .iter()
            .map(|&ecc| QrSymbol::generate(&payload, ecc).unwrap().size())
            .collect();
        assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
        assert!(sizes[0] < sizes[3]);
    }

    #[test]
    fn finder_pattern_is_dark() {
        let symbol = QrSymbol::generate(b"hello", EccLevel::Low).unwrap();
        assert_eq!(symbol.version(), 1);
        assert_eq!(symbol.size(), 21);
        assert!(symbol.is_dark(0, 0));
        assert!(symbol.is_dark(6, 6));
        assert!(!symbol.is_dark(7, 7));
        assert!(!symbol.is_dark(21, 0));
    }

    #[test]
    fn oversized_payload_fails() {
        let capacity = QrSymbol::capacity(EccLevel::High);
        assert_eq!(capacity, 1273);
        assert!(matches!(
            QrSymbol::generate(&vec![b'x'; capacity + 1], EccLevel::High),
            Err(Bw2QrError::PayloadTooLarge { .. })
        ));
    }
}
