// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal status lines and user-facing error text.

use std::io::Write;

use bw2qr_core::Bw2QrError;
use bw2qr_core::error::Result;

/// Width of the step label column.
const STATUS_WIDTH: usize = 40;

/// Run one phase of the program and print `<step>: [OK]` or `<step>: [KO]`.
pub fn step<T>(label: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let mut out = std::io::stdout().lock();
    let _ = write!(out, "{:<STATUS_WIDTH$}", format!("{label}: "));
    let _ = out.flush();
    drop(out);

    let result = f();
    println!("{}", tag(&result));
    result
}

fn tag<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => "[OK]",
        Err(_) => "[KO]",
    }
}

/// The error message, followed by a suggestion when one is known.
pub fn describe(err: &Bw2QrError) -> String {
    match hint(err) {
        Some(hint) => format!("{err}\nhint: {hint}"),
        None => err.to_string(),
    }
}

fn hint(err: &Bw2QrError) -> Option<&'static str> {
    match err {
        Bw2QrError::MissingArgument(_) | Bw2QrError::InvalidArgument(_) => {
            Some("run `bw2qr --help` for the list of options")
        }
        Bw2QrError::InvalidFormat(_) => {
            Some("export the vault from Bitwarden as unencrypted JSON")
        }
        Bw2QrError::PayloadTooLarge { .. } => {
            Some("shorten the notes or custom fields of that login")
        }
        Bw2QrError::DecodeVerificationFailed(_) => {
            Some("increase --qrcode-module-px-size or use more contrasting colors")
        }
        Bw2QrError::BatchFailed(messages) => messages
            .iter()
            .any(|m| m.contains("could not be decoded"))
            .then_some("increase --qrcode-module-px-size or use more contrasting colors"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_follow_the_result() {
        assert_eq!(tag(&Ok::<_, Bw2QrError>(())), "[OK]");
        assert_eq!(tag(&Err::<(), _>(Bw2QrError::Network("x".into()))), "[KO]");
    }

    #[test]
    fn step_passes_the_result_through() {
        assert_eq!(step("answer", || Ok(42)).unwrap(), 42);
        assert!(step("broken", || Err::<(), _>(Bw2QrError::InvalidArgument("x".into()))).is_err());
    }

    #[test]
    fn oversized_records_get_a_hint() {
        let err = Bw2QrError::PayloadTooLarge {
            name: "bank".into(),
            size: 600,
            max: 510,
        };
        let text = describe(&err);
        assert!(text.starts_with("can't convert 'bank' - entry size too big: 600 (max: 510)"));
        assert!(text.contains("hint: shorten"));
    }

    #[test]
    fn network_errors_have_no_hint() {
        assert_eq!(describe(&Bw2QrError::Network("timeout".into())), "network error: timeout");
    }
}
