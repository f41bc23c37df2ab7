// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload cipher — AES-256-CBC without block padding.
//
//   key:     SHA-256 of the password
//   iv:      16 random bytes, carried as base64 so it can be printed
//   padding: none, the plaintext is already block aligned
//
// Ciphertext length equals plaintext length, so every encrypted payload of
// the same padded size produces a QR code of the same version.

use aes::Aes256;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use bw2qr_core::error::{Bw2QrError, Result};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// Derive the AES-256 key from a password.
pub fn derive_key(password: &str) -> [u8; KEY_SIZE] {
    let digest = Sha256::digest(password.as_bytes());
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest);
    key
}

/// Generate a random initialisation vector, base64 encoded.
pub fn generate_iv() -> Result<String> {
    let mut iv = [0u8; BLOCK_SIZE];
    SystemRandom::new()
        .fill(&mut iv)
        .map_err(|_| Bw2QrError::Encryption("can't generate random IV".into()))?;
    Ok(encode_base64(&iv))
}

pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(data.trim())
        .map_err(|e| Bw2QrError::Decryption(format!("invalid base64: {e}")))
}

/// AES-256-CBC cipher bound to one password and one IV.
///
/// The key is derived once, so a single cipher can encrypt every record of
/// a batch.
#[derive(Clone)]
pub struct PayloadCipher {
    key: [u8; KEY_SIZE],
    iv: [u8; BLOCK_SIZE],
    iv_b64: String,
}

impl std::fmt::Debug for PayloadCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadCipher")
            .field("iv", &self.iv_b64)
            .finish_non_exhaustive()
    }
}

impl PayloadCipher {
    /// Create a cipher; a fresh IV is generated when `iv_b64` is `None`.
    pub fn new(password: &str, iv_b64: Option<&str>) -> Result<Self> {
        let iv_b64 = match iv_b64 {
            Some(iv) => iv.trim().to_owned(),
            None => generate_iv()?,
        };
        let iv_bytes = STANDARD
            .decode(&iv_b64)
            .map_err(|e| Bw2QrError::Encryption(format!("invalid base64 IV: {e}")))?;
        let iv: [u8; BLOCK_SIZE] = iv_bytes.as_slice().try_into().map_err(|_| {
            Bw2QrError::Encryption(format!(
                "invalid IV size: {} (should be {BLOCK_SIZE})",
                iv_bytes.len()
            ))
        })?;
        Ok(Self {
            key: derive_key(password),
            iv,
            iv_b64,
        })
    }

    /// The IV in its printable base64 form.
    pub fn iv_base64(&self) -> &str {
        &self.iv_b64
    }

    /// Encrypt a block-aligned plaintext.
    #[instrument(skip_all, fields(plaintext_len = plaintext.len()))]
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        if plaintext.len() % BLOCK_SIZE != 0 {
            return Err(Bw2QrError::Encryption(format!(
                "plaintext length {} is not a multiple of {BLOCK_SIZE}",
                plaintext.len()
            )));
        }
        let encryptor = Aes256CbcEnc::new_from_slices(&self.key, &self.iv)
            .map_err(|e| Bw2QrError::Encryption(format!("invalid key or iv size: {e}")))?;

        let mut buffer = plaintext.to_vec();
        let len = buffer.len();
        encryptor
            .encrypt_padded_mut::<NoPadding>(&mut buffer, len)
            .map_err(|_| Bw2QrError::Encryption("can't encrypt data using aes-256-cbc".into()))?;

        debug!(ciphertext_len = buffer.len(), "encryption complete");
        Ok(buffer)
    }

    /// Encrypt and return base64 text ready for a QR code.
    pub fn encrypt_to_base64(&self, plaintext: &[u8]) -> Result<String> {
        self.encrypt(plaintext).map(|c| encode_base64(&c))
    }

    /// Decrypt raw ciphertext produced by [`PayloadCipher::encrypt`].
    #[instrument(skip_all, fields(ciphertext_len = ciphertext.len()))]
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let decryptor = Aes256CbcDec::new_from_slices(&self.key, &self.iv)
            .map_err(|e| Bw2QrError::Decryption(format!("invalid key or iv size: {e}")))?;

        let mut buffer = ciphertext.to_vec();
        let plaintext = decryptor
            .decrypt_padded_mut::<NoPadding>(&mut buffer)
            .map_err(|_| {
                Bw2QrError::Decryption("ciphertext is not a whole number of blocks".into())
            })?
            .to_vec();

        debug!(plaintext_len = plaintext.len(), "decryption complete");
        Ok(plaintext)
    }

    /// Decrypt base64 text scanned from a QR code.
    pub fn decrypt_base64(&self, ciphertext_b64: &str) -> Result<Vec<u8>> {
        self.decrypt(&decode_base64(ciphertext_b64)?)
    }
}

/// One-shot encryption: returns base64 ciphertext.
pub fn encrypt_256_cbc(data: &[u8], iv_b64: &str, password: &str) -> Result<String> {
    PayloadCipher::new(password, Some(iv_b64))?.encrypt_to_base64(data)
}

/// One-shot decryption of raw ciphertext bytes.
pub fn decrypt_256_cbc(ciphertext: &[u8], iv_b64: &str, password: &str) -> Result<Vec<u8>> {
    PayloadCipher::new(password, Some(iv_b64))?.decrypt(ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(text: &str, len: usize) -> Vec<u8> {
        format!("{text:<len$}").into_bytes()
    }

    #[test]
    fn key_is_sha256_of_password() {
        // SHA-256("hello")
        assert_eq!(
            hex::encode(derive_key("hello")),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn generated_iv_is_one_block() {
        let iv = generate_iv().unwrap();
        assert_eq!(decode_base64(&iv).unwrap().len(), BLOCK_SIZE);
        assert_ne!(iv, generate_iv().unwrap());
    }

    #[test]
    fn round_trip_for_many_passwords() {
        let iv = generate_iv().unwrap();
        let plaintext = padded(r#"{ "login": { "username": "u" } }"#, 368);
        for password in ["", "p", "correct-horse-battery-staple", "pässwörd ✓"] {
            let ciphertext = encrypt_256_cbc(&plaintext, &iv, password).unwrap();
            let decrypted =
                decrypt_256_cbc(&decode_base64(&ciphertext).unwrap(), &iv, password).unwrap();
            assert_eq!(decrypted, plaintext);
        }
    }

    #[test]
    fn ciphertext_length_equals_plaintext_length() {
        let cipher = PayloadCipher::new("secret", None).unwrap();
        let plaintext = padded("abc", 368);
        let ciphertext = cipher.encrypt(&plaintext).unwrap();
        assert_eq!(ciphertext.len(), 368);
        assert_ne!(ciphertext, plaintext);
        // 368 bytes → 492 base64 characters
        assert_eq!(cipher.encrypt_to_base64(&plaintext).unwrap().len(), 492);
    }

    #[test]
    fn same_iv_is_deterministic() {
        let iv = "AAECAwQFBgcICQoLDA0ODw==";
        let plaintext = padded("x", 32);
        assert_eq!(
            encrypt_256_cbc(&plaintext, iv, "pw").unwrap(),
            encrypt_256_cbc(&plaintext, iv, "pw").unwrap()
        );
    }

    #[test]
    fn wrong_password_does_not_recover_plaintext() {
        let iv = generate_iv().unwrap();
        let plaintext = padded("secret", 64);
        let ciphertext = encrypt_256_cbc(&plaintext, &iv, "alpha").unwrap();
        let decrypted =
            decrypt_256_cbc(&decode_base64(&ciphertext).unwrap(), &iv, "beta").unwrap();
        assert_ne!(decrypted, plaintext);
    }

    #[test]
    fn unaligned_plaintext_is_rejected() {
        let cipher = PayloadCipher::new("pw", None).unwrap();
        assert!(matches!(
            cipher.encrypt(b"not aligned"),
            Err(Bw2QrError::Encryption(_))
        ));
    }

    #[test]
    fn bad_iv_is_rejected() {
        assert!(PayloadCipher::new("pw", Some("AAAA")).is_err());
        assert!(PayloadCipher::new("pw", Some("%%%")).is_err());
    }

    #[test]
    fn debug_output_hides_the_key() {
        let cipher = PayloadCipher::new("pw", Some("AAECAwQFBgcICQoLDA0ODw==")).unwrap();
        let text = format!("{cipher:?}");
        assert!(text.contains("AAECAwQFBgcICQoLDA0ODw=="));
        assert!(!text.contains("key"));
    }
}
