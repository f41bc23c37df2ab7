// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Option set — named, typed conversion parameters.
//
// Every option is identified by an `OptionKey` and carries an `OptionValue`.
// Values are read back through `FromOptionValue`, which returns the caller's
// default when the key is absent or holds a value of another type.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::error::{Bw2QrError, Result};
use crate::types::EccLevel;

/// Identifier of every recognised option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    QrcodeName,
    QrcodeUsername,
    QrcodePassword,
    QrcodeTotp,
    QrcodeUrl,
    QrcodeFields,
    QrcodeData,
    QrcodeEcc,
    QrcodeModulePxSize,
    QrcodeBorderPxSize,
    QrcodeModuleColor,
    QrcodeBackgroundColor,
    FrameBorderColor,
    FrameBorderWidthSize,
    FrameBorderHeightSize,
    FrameBorderRadius,
    FrameLogoSize,
    FrameFontFamily,
    FrameFontColor,
    FrameFontSize,
}

/// The value type an option expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Text,
    Fields,
    Size,
    Number,
    Ecc,
}

impl OptionKey {
    pub const ALL: [OptionKey; 20] = [
        Self::QrcodeName,
        Self::QrcodeUsername,
        Self::QrcodePassword,
        Self::QrcodeTotp,
        Self::QrcodeUrl,
        Self::QrcodeFields,
        Self::QrcodeData,
        Self::QrcodeEcc,
        Self::QrcodeModulePxSize,
        Self::QrcodeBorderPxSize,
        Self::QrcodeModuleColor,
        Self::QrcodeBackgroundColor,
        Self::FrameBorderColor,
        Self::FrameBorderWidthSize,
        Self::FrameBorderHeightSize,
        Self::FrameBorderRadius,
        Self::FrameLogoSize,
        Self::FrameFontFamily,
        Self::FrameFontColor,
        Self::FrameFontSize,
    ];

    /// Kebab-case name, as used on the command line and in style files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QrcodeName => "qrcode-name",
            Self::QrcodeUsername => "qrcode-username",
            Self::QrcodePassword => "qrcode-password",
            Self::QrcodeTotp => "qrcode-totp",
            Self::QrcodeUrl => "qrcode-url",
            Self::QrcodeFields => "qrcode-fields",
            Self::QrcodeData => "qrcode-data",
            Self::QrcodeEcc => "qrcode-ecc",
            Self::QrcodeModulePxSize => "qrcode-module-px-size",
            Self::QrcodeBorderPxSize => "qrcode-border-px-size",
            Self::QrcodeModuleColor => "qrcode-module-color",
            Self::QrcodeBackgroundColor => "qrcode-background-color",
            Self::FrameBorderColor => "frame-border-color",
            Self::FrameBorderWidthSize => "frame-border-width-size",
            Self::FrameBorderHeightSize => "frame-border-height-size",
            Self::FrameBorderRadius => "frame-border-radius",
            Self::FrameLogoSize => "frame-logo-size",
            Self::FrameFontFamily => "frame-font-family",
            Self::FrameFontColor => "frame-font-color",
            Self::FrameFontSize => "frame-font-size",
        }
    }

    pub fn kind(&self) -> OptionKind {
        match self {
            Self::QrcodeFields => OptionKind::Fields,
            Self::QrcodeEcc => OptionKind::Ecc,
            Self::QrcodeModulePxSize
            | Self::QrcodeBorderPxSize
            | Self::FrameBorderWidthSize
            | Self::FrameBorderHeightSize
            | Self::FrameBorderRadius
            | Self::FrameLogoSize => OptionKind::Size,
            Self::FrameFontSize => OptionKind::Number,
            _ => OptionKind::Text,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Convert a JSON value into this option's value type.
    ///
    /// Values that cannot be converted are kept as-is; reading them back
    /// yields the caller's default.
    pub fn value_from_json(&self, value: &Value) -> OptionValue {
        let converted = match (self.kind(), value) {
            (OptionKind::Text, Value::String(s)) => Some(OptionValue::Text(s.clone())),
            (OptionKind::Size, Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(OptionValue::Size),
            (OptionKind::Number, Value::Number(n)) => n.as_f64().map(OptionValue::Number),
            (OptionKind::Ecc, Value::String(s)) => s.parse().ok().map(OptionValue::Ecc),
            (OptionKind::Fields, Value::Object(map)) => Some(OptionValue::Fields(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.as_str().unwrap_or_default().to_owned()))
                    .collect(),
            )),
            _ => None,
        };
        converted.unwrap_or_else(|| OptionValue::Raw(value.to_string()))
    }
}

impl std::fmt::Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Text(String),
    Fields(Vec<(String, String)>),
    Size(u32),
    Number(f64),
    Ecc(EccLevel),
    /// A value whose type did not match its key when it was parsed.
    Raw(String),
}

impl OptionValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Fields(_) => "fields",
            Self::Size(_) => "size",
            Self::Number(_) => "number",
            Self::Ecc(_) => "ecc level",
            Self::Raw(_) => "unparsed value",
        }
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        Self::Size(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<EccLevel> for OptionValue {
    fn from(v: EccLevel) -> Self {
        Self::Ecc(v)
    }
}

impl From<Vec<(String, String)>> for OptionValue {
    fn from(v: Vec<(String, String)>) -> Self {
        Self::Fields(v)
    }
}

/// Typed extraction from an `OptionValue`.
pub trait FromOptionValue: Sized {
    fn from_option_value(value: &OptionValue) -> Option<Self>;
}

impl FromOptionValue for String {
    fn from_option_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromOptionValue for u32 {
    fn from_option_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Size(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromOptionValue for f64 {
    fn from_option_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Number(v) => Some(*v),
            OptionValue::Size(v) => Some(f64::from(*v)),
            _ => None,
        }
    }
}

impl FromOptionValue for EccLevel {
    fn from_option_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Ecc(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromOptionValue for Vec<(String, String)> {
    fn from_option_value(value: &OptionValue) -> Option<Self> {
        match value {
            OptionValue::Fields(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// A set of options. Setting a key twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    values: BTreeMap<OptionKey, OptionValue>,
}

impl OptionSet {
    pub fn new<I, V>(options: I) -> Self
    where
        I: IntoIterator<Item = (OptionKey, V)>,
        V: Into<OptionValue>,
    {
        let mut set = Self::default();
        set.extend(options);
        set
    }

    pub fn set(&mut self, key: OptionKey, value: impl Into<OptionValue>) {
        self.values.insert(key, value.into());
    }

    pub fn extend<I, V>(&mut self, options: I)
    where
        I: IntoIterator<Item = (OptionKey, V)>,
        V: Into<OptionValue>,
    {
        for (key, value) in options {
            self.set(key, value);
        }
    }

    /// Overlay `other` on top of this set; its values win.
    pub fn merge(&mut self, other: OptionSet) {
        self.values.extend(other.values);
    }

    pub fn contains(&self, key: OptionKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys from `keys` that are not set, in the order given.
    pub fn missing(&self, keys: &[OptionKey]) -> Vec<OptionKey> {
        keys.iter().copied().filter(|k| !self.contains(*k)).collect()
    }

    /// Fail with `MissingArgument` naming every absent key.
    pub fn require(&self, keys: &[OptionKey]) -> Result<()> {
        let missing = self.missing(keys);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Bw2QrError::MissingArgument(
                missing.iter().map(|k| k.name().to_owned()).collect(),
            ))
        }
    }

    /// Read an option, falling back to `default` when it is absent or holds
    /// a value of another type.
    pub fn get<T: FromOptionValue>(&self, key: OptionKey, default: T) -> T {
        let Some(value) = self.values.get(&key) else {
            return default;
        };
        match T::from_option_value(value) {
            Some(v) => v,
            None => {
                warn!(
                    option = key.name(),
                    found = value.type_name(),
                    "option has an unexpected type, using the default"
                );
                default
            }
        }
    }

    /// Build a set from a JSON object keyed by option names.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Bw2QrError::InvalidArgument("style configuration must be a JSON object".into())
        })?;
        let mut set = Self::default();
        for (name, raw) in object {
            let key = OptionKey::from_name(name).ok_or_else(|| {
                Bw2QrError::InvalidArgument(format!("unknown style option: \"{name}\""))
            })?;
            set.set(key, key.value_from_json(raw));
        }
        Ok(set)
    }

    /// Load a JSON style file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let value: Value = serde_json::from_str(&text)?;
        Self::from_json(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn last_value_wins() {
        let set = OptionSet::new([
            (OptionKey::FrameLogoSize, OptionValue::Size(48)),
            (OptionKey::FrameLogoSize, OptionValue::Size(32)),
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(OptionKey::FrameLogoSize, 0u32), 32);
    }

    #[test]
    fn require_lists_missing_keys() {
        let set = OptionSet::new([(OptionKey::QrcodeName, "x")]);
        let missing = set.missing(&[
            OptionKey::QrcodeName,
            OptionKey::QrcodeData,
            OptionKey::FrameFontSize,
        ]);
        assert_eq!(missing, [OptionKey::QrcodeData, OptionKey::FrameFontSize]);

        match set.require(&[OptionKey::QrcodeData, OptionKey::QrcodeName]) {
            Err(Bw2QrError::MissingArgument(keys)) => assert_eq!(keys, ["qrcode-data"]),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(set.require(&[OptionKey::QrcodeName]).is_ok());
    }

    #[test]
    fn type_mismatch_returns_default() {
        let set = OptionSet::new([(OptionKey::FrameLogoSize, "large")]);
        assert_eq!(set.get(OptionKey::FrameLogoSize, 48u32), 48);
        assert_eq!(set.get(OptionKey::FrameFontSize, 28.0f64), 28.0);
    }

    #[test]
    fn number_accepts_integer_sizes() {
        let set = OptionSet::new([(OptionKey::FrameFontSize, 20u32)]);
        assert_eq!(set.get(OptionKey::FrameFontSize, 28.0f64), 20.0);
    }

    #[test]
    fn merge_overrides_existing_values() {
        let mut base = OptionSet::new([
            (OptionKey::QrcodeModuleColor, "black"),
            (OptionKey::QrcodeBackgroundColor, "white"),
        ]);
        base.merge(OptionSet::new([(OptionKey::QrcodeModuleColor, "navy")]));
        assert_eq!(base.get(OptionKey::QrcodeModuleColor, String::new()), "navy");
        assert_eq!(base.get(OptionKey::QrcodeBackgroundColor, String::new()), "white");
    }

    #[test]
    fn json_values_follow_key_kinds() {
        let set = OptionSet::from_json(&json!({
            "qrcode-module-px-size": 4,
            "frame-font-size": 22.5,
            "qrcode-ecc": "quartile",
            "frame-border-radius": "round",
            "qrcode-fields": { "pin": "1234" }
        }))
        .unwrap();
        assert_eq!(set.get(OptionKey::QrcodeModulePxSize, 3u32), 4);
        assert_eq!(set.get(OptionKey::FrameFontSize, 28.0f64), 22.5);
        assert_eq!(set.get(OptionKey::QrcodeEcc, EccLevel::High), EccLevel::Quartile);
        assert_eq!(set.get(OptionKey::FrameBorderRadius, 15u32), 15);
        assert_eq!(
            set.get(OptionKey::QrcodeFields, Vec::<(String, String)>::new()),
            vec![("pin".to_owned(), "1234".to_owned())]
        );
    }

    #[test]
    fn json_rejects_unknown_keys() {
        let err = OptionSet::from_json(&json!({ "qrcode-shape": "dots" })).unwrap_err();
        assert!(err.to_string().contains("qrcode-shape"));
        assert!(OptionSet::from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn loads_style_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.json");
        std::fs::write(&path, r##"{ "frame-border-color": "#112233" }"##).unwrap();
        let set = OptionSet::from_json_file(&path).unwrap();
        assert_eq!(set.get(OptionKey::FrameBorderColor, String::new()), "#112233");
    }

    #[test]
    fn every_key_round_trips_its_name() {
        for key in OptionKey::ALL {
            assert_eq!(OptionKey::from_name(key.name()), Some(key));
        }
    }
}
