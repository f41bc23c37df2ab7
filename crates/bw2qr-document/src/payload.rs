// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Payload encoder — canonical, fixed-length text for one QR code.
//
// Every payload produced by one encoder has the same length, so every QR
// symbol of a batch has the same version and module count. Plain payloads
// are padded with spaces to `MAX_PAYLOAD_BYTES`. Encrypted payloads are
// padded to a block-aligned length, encrypted, and base64 encoded.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use bw2qr_core::Record;
use bw2qr_core::error::{Bw2QrError, Result};
use bw2qr_security::cipher::BLOCK_SIZE;
use bw2qr_security::{PayloadCipher, fingerprint};

/// Fixed payload length of a plain QR code.
///
/// 510 bytes in a single byte-mode segment is the largest payload that
/// still fits QR version 24 at error-correction level H.
pub const MAX_PAYLOAD_BYTES: usize = 510;

/// A single-entry field object spread over three lines by the pretty printer.
const FIELD_OBJECT: &str = r"(?m)^ {4}\{\n {6}([^\n]+)\n {4}\}";

static FIELD_OBJECT_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn field_object() -> Result<&'static Regex> {
    FIELD_OBJECT_RE
        .get_or_init(|| Regex::new(FIELD_OBJECT).ok())
        .as_ref()
        .ok_or_else(|| Bw2QrError::InvalidFormat("invalid field pattern".into()))
}

/// Largest plaintext that still fits `max` once encrypted and base64 encoded.
///
/// `floor(floor(max/16)*16*3/4/16)*16 - 1`, which is 367 for 510. The
/// plaintext is then padded to one byte more (a whole number of blocks),
/// and its base64 ciphertext stays within `max`.
pub const fn encrypted_content_limit(max: usize) -> usize {
    let aligned = max / BLOCK_SIZE * BLOCK_SIZE;
    let base64_budget = aligned * 3 / 4;
    base64_budget / BLOCK_SIZE * BLOCK_SIZE - 1
}

/// Serialize a record into its canonical JSON text.
///
/// Login keys keep a fixed order and custom fields keep the record's order.
/// Each field object is collapsed onto one line.
pub fn serialize_record(record: &Record) -> Result<String> {
    let mut login = Map::new();
    login.insert("username".into(), Value::String(record.username.clone()));
    login.insert("password".into(), Value::String(record.password.clone()));
    login.insert("totp".into(), Value::String(record.totp.clone()));

    let fields = record
        .fields()
        .iter()
        .map(|field| {
            let mut entry = Map::new();
            entry.insert(field.name.clone(), Value::String(field.value.clone()));
            Value::Object(entry)
        })
        .collect();

    let mut root = Map::new();
    root.insert("login".into(), Value::Object(login));
    root.insert("fields".into(), Value::Array(fields));

    let pretty = serde_json::to_string_pretty(&Value::Object(root))?;
    Ok(field_object()?.replace_all(&pretty, "    { $1 }").into_owned())
}

/// Encoded, fixed-length content of one QR code.
#[derive(Clone, PartialEq, Eq)]
pub struct Payload {
    text: String,
    encrypted: bool,
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payload")
            .field("len", &self.text.len())
            .field("fingerprint", &fingerprint(self.text.as_bytes()))
            .field("encrypted", &self.encrypted)
            .finish()
    }
}

impl Payload {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Builds fixed-length payloads, optionally encrypted.
#[derive(Debug, Clone)]
pub struct PayloadEncoder {
    max_len: usize,
    cipher: Option<PayloadCipher>,
}

impl Default for PayloadEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadEncoder {
    /// Plain encoder with the default payload length.
    pub fn new() -> Self {
        Self {
            max_len: MAX_PAYLOAD_BYTES,
            cipher: None,
        }
    }

    /// Encoder that encrypts every payload with `cipher`.
    pub fn encrypted(cipher: PayloadCipher) -> Self {
        Self {
            max_len: MAX_PAYLOAD_BYTES,
            cipher: Some(cipher),
        }
    }

    /// Use a different QR capacity budget.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    pub fn cipher(&self) -> Option<&PayloadCipher> {
        self.cipher.as_ref()
    }

    /// Largest serialized content accepted before padding.
    pub fn content_limit(&self) -> usize {
        match self.cipher {
            Some(_) => encrypted_content_limit(self.max_len),
            None => self.max_len,
        }
    }

    /// Length the content is padded to before any encryption.
    pub fn padded_len(&self) -> usize {
        match self.cipher {
            Some(_) => self.content_limit() + 1,
            None => self.max_len,
        }
    }

    /// Length of every payload this encoder produces.
    pub fn payload_len(&self) -> usize {
        match self.cipher {
            Some(_) => self.padded_len().div_ceil(3) * 4,
            None => self.max_len,
        }
    }

    /// Encode a record.
    #[instrument(skip_all, fields(name = %record.name))]
    pub fn encode_record(&self, record: &Record) -> Result<Payload> {
        let text = serialize_record(record)?;
        self.encode_text(&record.name, &text)
    }

    /// Encode caller-supplied text; `name` is only used in errors and logs.
    pub fn encode_text(&self, name: &str, text: &str) -> Result<Payload> {
        let limit = self.content_limit();
        if text.len() > limit {
            return Err(Bw2QrError::PayloadTooLarge {
                name: name.to_owned(),
                size: text.len(),
                max: limit,
            });
        }

        // Padding counts bytes, not chars.
        let mut padded = String::with_capacity(self.padded_len());
        padded.push_str(text);
        padded.extend(std::iter::repeat_n(' ', self.padded_len() - text.len()));
        let payload = match &self.cipher {
            Some(cipher) => Payload {
                text: cipher.encrypt_to_base64(padded.as_bytes())?,
                encrypted: true,
            },
            None => Payload {
                text: padded,
                encrypted: false,
            },
        };

        debug!(
            name,
            content_len = text.len(),
            payload_len = payload.len(),
            fingerprint = %fingerprint(payload.as_bytes()),
            "payload encoded"
        );
        Ok(payload)
    }
}
