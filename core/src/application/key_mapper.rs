// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Key Mapper
//!
//! Turns one provider's raw credential fields into the payload written to
//! the store. The strategy is resolved per provider:
//!
//! | Condition | Strategy |
//! |-----------|----------|
//! | schema entry exists and at least one populated field matches it | `SchemaMapped` |
//! | no schema entry, or no populated field matches | `RawPassthrough` |
//!
//! `SchemaMapped` keeps only the matched fields, renamed. `RawPassthrough`
//! keeps every populated field under its original name. Output follows the
//! input's field order in both cases.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Deterministic, side-effect free field normalization

use crate::domain::credentials::{NormalizedSecretPayload, ProviderCredentialSet};
use crate::domain::key_schema::{KeySchema, ProviderSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingStrategy {
    SchemaMapped,
    RawPassthrough,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MappingResult {
    /// Every field was empty or absent; the provider is skipped
    NothingToMap,
    Mapped {
        strategy: MappingStrategy,
        payload: NormalizedSecretPayload,
        /// Populated target field names, in output order
        mapped_keys: Vec<String>,
    },
}

pub struct KeyMapper<'a> {
    schema: &'a KeySchema,
}

impl<'a> KeyMapper<'a> {
    pub fn new(schema: &'a KeySchema) -> Self {
        Self { schema }
    }

    pub fn map(&self, provider: &str, credentials: &ProviderCredentialSet) -> MappingResult {
        if !credentials.has_values() {
            return MappingResult::NothingToMap;
        }

        let strategy = self.resolve_strategy(provider, credentials);
        let mut payload = NormalizedSecretPayload::new();

        match (strategy, self.schema.provider(provider)) {
            (MappingStrategy::SchemaMapped, Some(fields)) => {
                for (raw, value) in credentials.populated() {
                    if let Some(target) = fields.target_for(raw) {
                        payload.insert(target, value.clone());
                    }
                }
            }
            _ => {
                for (raw, value) in credentials.populated() {
                    payload.insert(raw, value.clone());
                }
            }
        }

        let mapped_keys = payload.keys();
        MappingResult::Mapped {
            strategy,
            payload,
            mapped_keys,
        }
    }

    pub fn resolve_strategy(
        &self,
        provider: &str,
        credentials: &ProviderCredentialSet,
    ) -> MappingStrategy {
        match self.schema.provider(provider) {
            Some(fields) if any_field_matches(fields, credentials) => MappingStrategy::SchemaMapped,
            _ => MappingStrategy::RawPassthrough,
        }
    }
}

fn any_field_matches(fields: &ProviderSchema, credentials: &ProviderCredentialSet) -> bool {
    credentials
        .populated()
        .any(|(raw, _)| fields.target_for(raw).is_some())
}
