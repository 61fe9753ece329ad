// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Credential Parser
//!
//! Parses decrypted `credentials.yaml` content. The only structural
//! requirement is the `credentialholder.admin` path; provider entries below
//! it are taken as-is and field names are left for the key mapper.
//!
//! ```yaml
//! credentialholder:
//!   admin:
//!     aws:
//!       ClientId: AKIA...
//!       ClientSecret: ...
//!     gcp:
//!       ProjectID: ""
//! ```

use serde_yaml::Value as YamlValue;

use crate::domain::credentials::{CredentialBundle, DecryptedContent, ProviderCredentialSet};
use crate::domain::errors::ParseError;

const HOLDER_KEY: &str = "credentialholder";
const ADMIN_KEY: &str = "admin";

pub struct CredentialParser;

impl CredentialParser {
    pub fn parse(content: &DecryptedContent) -> Result<CredentialBundle, ParseError> {
        Self::parse_str(content.as_str())
    }

    /// Parse plaintext YAML into the provider-keyed credential mapping
    pub fn parse_str(text: &str) -> Result<CredentialBundle, ParseError> {
        let document: YamlValue =
            serde_yaml::from_str(text).map_err(|e| ParseError::InvalidYaml(e.to_string()))?;

        let holder = document
            .get(HOLDER_KEY)
            .ok_or(ParseError::MissingSection(HOLDER_KEY))?;
        let admin = holder
            .get(ADMIN_KEY)
            .ok_or(ParseError::MissingSection("credentialholder.admin"))?;
        let admin = admin.as_mapping().ok_or_else(|| ParseError::NotAMapping {
            section: "credentialholder.admin".to_string(),
        })?;

        let mut providers = Vec::with_capacity(admin.len());
        for (key, entry) in admin {
            let provider = key_to_string(key);
            let credentials = match entry {
                YamlValue::Null => ProviderCredentialSet::new(),
                YamlValue::Mapping(fields) => {
                    let mut set = ProviderCredentialSet::new();
                    for (field, value) in fields {
                        let value = serde_json::to_value(value)
                            .map_err(|e| ParseError::InvalidYaml(e.to_string()))?;
                        set.insert(key_to_string(field), value);
                    }
                    set
                }
                _ => {
                    return Err(ParseError::NotAMapping {
                        section: format!("credentialholder.admin.{}", provider),
                    })
                }
            };
            providers.push((provider, credentials));
        }

        tracing::debug!(providers = providers.len(), "Parsed credential bundle");
        Ok(CredentialBundle::new(providers))
    }
}

fn key_to_string(key: &YamlValue) -> String {
    match key {
        YamlValue::String(s) => s.clone(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
