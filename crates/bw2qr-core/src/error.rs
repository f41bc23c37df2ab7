// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for bw2qr.

use thiserror::Error;

/// Top-level error type for all bw2qr operations.
#[derive(Debug, Error)]
pub enum Bw2QrError {
    // -- Configuration errors --
    #[error("missing argument(s): {}", .0.join(", "))]
    MissingArgument(Vec<String>),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- Import errors --
    #[error("invalid json file format: {0}")]
    InvalidFormat(String),

    // -- Per-record conversion errors --
    #[error("can't convert '{name}' - entry size too big: {size} (max: {max})")]
    PayloadTooLarge {
        name: String,
        size: usize,
        max: usize,
    },

    #[error("can't convert '{0}' - the QR code image could not be decoded back")]
    DecodeVerificationFailed(String),

    // -- Collaborators --
    #[error("network error: {0}")]
    Network(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Batch --
    #[error("{} qr code(s) failed:\n{}", .0.len(), .0.join("\n"))]
    BatchFailed(Vec<String>),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// How far an error propagates before it is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Recorded against a single record; sibling jobs continue.
    Record,
    /// Absorbed where it happens (e.g. a missing logo).
    Recovered,
    /// Aborts the whole run.
    Run,
}

impl Bw2QrError {
    /// Classify this error for the batch and CLI layers.
    pub fn scope(&self) -> ErrorScope {
        match self {
            Self::PayloadTooLarge { .. }
            | Self::DecodeVerificationFailed(_)
            | Self::Encryption(_)
            | Self::ImageError(_) => ErrorScope::Record,
            Self::Network(_) => ErrorScope::Recovered,
            Self::MissingArgument(_)
            | Self::InvalidArgument(_)
            | Self::InvalidFormat(_)
            | Self::Decryption(_)
            | Self::PdfError(_)
            | Self::BatchFailed(_)
            | Self::Io(_)
            | Self::Serialization(_) => ErrorScope::Run,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, Bw2QrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_too_large_reports_both_sizes() {
        let err = Bw2QrError::PayloadTooLarge {
            name: "bank".into(),
            size: 612,
            max: 510,
        };
        let msg = err.to_string();
        assert!(msg.contains("bank"));
        assert!(msg.contains("612"));
        assert!(msg.contains("510"));
        assert_eq!(err.scope(), ErrorScope::Record);
    }

    #[test]
    fn missing_argument_lists_every_key() {
        let err = Bw2QrError::MissingArgument(vec!["qrcode-data".into(), "frame-font-size".into()]);
        assert_eq!(
            err.to_string(),
            "missing argument(s): qrcode-data, frame-font-size"
        );
        assert_eq!(err.scope(), ErrorScope::Run);
    }

    #[test]
    fn batch_failure_concatenates_messages() {
        let err = Bw2QrError::BatchFailed(vec!["a: boom".into(), "b: bang".into()]);
        assert_eq!(err.to_string(), "2 qr code(s) failed:\na: boom\nb: bang");
    }

    #[test]
    fn network_errors_are_recovered() {
        assert_eq!(
            Bw2QrError::Network("timed out".into()).scope(),
            ErrorScope::Recovered
        );
    }
}
