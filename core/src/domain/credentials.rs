// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Credentials
//!
//! In-memory representation of decrypted credential material. Every type
//! here holds secrets, so none of them print values through `Debug`.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Decrypted content, per-provider credential sets and
//!   normalized secret payloads

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Where the key that successfully decrypted the bundle came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// `--key-file <path>`
    ExplicitFile(PathBuf),
    /// `~/.cloud-barista/.tmp_enc_key`
    DefaultFile(PathBuf),
    /// Interactive passphrase entry (1-based attempt number)
    Prompt { attempt: u32 },
}

impl KeySource {
    /// A live prompt doubles as user confirmation; file keys do not.
    pub fn is_interactive(&self) -> bool {
        matches!(self, KeySource::Prompt { .. })
    }
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::ExplicitFile(path) | KeySource::DefaultFile(path) => {
                write!(f, "key file {}", path.display())
            }
            KeySource::Prompt { attempt } => write!(f, "passphrase (attempt {})", attempt),
        }
    }
}

/// Plaintext of a decrypted bundle
pub struct DecryptedContent {
    text: String,
    key_source: KeySource,
}

impl DecryptedContent {
    pub fn new(text: String, key_source: KeySource) -> Self {
        Self { text, key_source }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn key_source(&self) -> &KeySource {
        &self.key_source
    }
}

impl fmt::Debug for DecryptedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptedContent")
            .field("len", &self.text.len())
            .field("key_source", &self.key_source)
            .finish()
    }
}

/// Every falsy value counts as "not provided": null, `false`, zero, empty
/// strings and empty collections.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Raw field → value mapping for one provider, in document order
#[derive(Clone, Default, PartialEq)]
pub struct ProviderCredentialSet {
    fields: Vec<(String, Value)>,
}

impl ProviderCredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields with a usable value, in encounter order
    pub fn populated(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter(|(_, value)| !is_blank(value))
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn has_values(&self) -> bool {
        self.populated().next().is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ProviderCredentialSet {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (field, value) in iter {
            set.insert(field, value);
        }
        set
    }
}

impl fmt::Debug for ProviderCredentialSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.field_names()).finish()
    }
}

/// Provider-keyed credential mapping parsed from `credentialholder.admin`
#[derive(Debug, Clone, Default)]
pub struct CredentialBundle {
    providers: Vec<(String, ProviderCredentialSet)>,
}

impl CredentialBundle {
    pub fn new(providers: Vec<(String, ProviderCredentialSet)>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn providers(&self) -> impl Iterator<Item = (&str, &ProviderCredentialSet)> {
        self.providers.iter().map(|(name, set)| (name.as_str(), set))
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderCredentialSet> {
        self.providers
            .iter()
            .find(|(provider, _)| provider == name)
            .map(|(_, set)| set)
    }
}

/// Target field → value mapping written to the store for one provider.
///
/// Serializes as a JSON object in insertion order.
#[derive(Clone, Default, PartialEq)]
pub struct NormalizedSecretPayload {
    fields: Vec<(String, Value)>,
}

impl NormalizedSecretPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for NormalizedSecretPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl fmt::Debug for NormalizedSecretPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedSecretPayload")
            .field("keys", &self.keys())
            .finish()
    }
}
