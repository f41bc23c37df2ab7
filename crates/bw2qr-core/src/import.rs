// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bitwarden JSON export parser.
//
// Only favourite login items are kept; everything else in the export is
// skipped. Structural problems abort the import with `InvalidFormat`.

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::{Bw2QrError, Result};
use crate::types::Record;

/// Bitwarden item type for logins.
const LOGIN_ITEM_TYPE: i64 = 1;

/// Parse an export file from disk.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let bytes = std::fs::read(path.as_ref())?;
    parse(&bytes)
}

/// Parse an unencrypted Bitwarden export.
pub fn parse(json_bytes: &[u8]) -> Result<Vec<Record>> {
    let db: Value = serde_json::from_slice(json_bytes)
        .map_err(|e| Bw2QrError::InvalidFormat(format!("not valid JSON: {e}")))?;

    let items = db
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| Bw2QrError::InvalidFormat("missing \"items\" array".into()))?;

    let mut records = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let name = item.get("name").and_then(Value::as_str);
        let kind = item.get("type").and_then(Value::as_i64);
        let favorite = item.get("favorite").and_then(Value::as_bool);
        let (Some(name), Some(kind), Some(favorite)) = (name, kind, favorite) else {
            return Err(Bw2QrError::InvalidFormat(format!(
                "item #{index} needs \"name\", \"type\" and \"favorite\""
            )));
        };

        if kind != LOGIN_ITEM_TYPE || !favorite {
            debug!(index, kind, favorite, "skipping item");
            continue;
        }

        let login = item
            .get("login")
            .filter(|l| l.is_object())
            .ok_or_else(|| {
                Bw2QrError::InvalidFormat(format!("item \"{name}\" has no \"login\" object"))
            })?;

        let url = login
            .get("uris")
            .and_then(Value::as_array)
            .and_then(|uris| uris.first())
            .map(|uri| string_field(uri, "uri"))
            .unwrap_or_default();

        let mut record = Record::new(name)
            .with_login(
                string_field(login, "username"),
                string_field(login, "password"),
                string_field(login, "totp"),
            )
            .with_url(url);

        if let Some(fields) = item.get("fields").and_then(Value::as_array) {
            for field in fields {
                let field_name = string_field(field, "name");
                if !field_name.is_empty() {
                    record.set_field(field_name, string_field(field, "value"));
                }
            }
        }

        records.push(record);
    }

    info!(total = items.len(), kept = records.len(), "export parsed");
    Ok(records)
}

/// Read a string member; absent, null or non-string values read as empty.
fn string_field(object: &Value, name: &str) -> String {
    object
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}
