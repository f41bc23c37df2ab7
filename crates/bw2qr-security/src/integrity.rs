// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload fingerprints — SHA-256 hashing so payloads can be logged and
// compared without ever writing the secret content itself.

use sha2::{Digest, Sha256};

/// Number of hex characters kept in a short fingerprint.
const SHORT_FINGERPRINT_LEN: usize = 12;

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// A short fingerprint suitable for log lines.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hex = hash_bytes(data);
    hex.truncate(SHORT_FINGERPRINT_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn hash_empty_input() {
        assert_eq!(hash_bytes(b""), EMPTY_SHA256);
    }

    #[test]
    fn fingerprint_is_hash_prefix() {
        assert_eq!(fingerprint(b""), &EMPTY_SHA256[..SHORT_FINGERPRINT_LEN]);
    }
}
