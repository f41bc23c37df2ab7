// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bw2qr-security — payload encryption and fingerprints.
//
// QR payloads can be encrypted with AES-256-CBC so a printed sheet is
// useless without the password. Fingerprints let the rest of the pipeline
// log and compare payloads without exposing them.

pub mod cipher;
pub mod integrity;

pub use cipher::{
    PayloadCipher, decode_base64, decrypt_256_cbc, encode_base64, encrypt_256_cbc, generate_iv,
};
pub use integrity::{fingerprint, hash_bytes};
