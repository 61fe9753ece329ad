// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Key Schema
//!
//! Static translation table from cb-tumblebug credential field names to the
//! names OpenTofu / Terraform providers read from the environment.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Per-provider field-name normalization data

use std::collections::HashMap;

/// Built-in table: provider → ordered `(raw field, target field)` pairs.
const BUILTIN_SCHEMA: &[(&str, &[(&str, &str)])] = &[
    (
        "aws",
        &[
            ("ClientId", "AWS_ACCESS_KEY_ID"),
            ("ClientSecret", "AWS_SECRET_ACCESS_KEY"),
        ],
    ),
    (
        "azure",
        &[
            ("ClientId", "ARM_CLIENT_ID"),
            ("ClientSecret", "ARM_CLIENT_SECRET"),
            ("TenantId", "ARM_TENANT_ID"),
            ("SubscriptionId", "ARM_SUBSCRIPTION_ID"),
        ],
    ),
    (
        "gcp",
        &[
            ("ProjectID", "project_id"),
            ("ClientEmail", "client_email"),
            ("PrivateKey", "private_key"),
            ("private_key_id", "private_key_id"),
            ("client_id", "client_id"),
        ],
    ),
    (
        "alibaba",
        &[
            ("ClientId", "ALIBABA_CLOUD_ACCESS_KEY_ID"),
            ("ClientSecret", "ALIBABA_CLOUD_ACCESS_KEY_SECRET"),
        ],
    ),
    ("ibm", &[("ApiKey", "IC_API_KEY")]),
    (
        "ncp",
        &[
            ("ClientId", "NCLOUD_ACCESS_KEY"),
            ("ClientSecret", "NCLOUD_SECRET_KEY"),
        ],
    ),
    (
        "tencent",
        &[
            ("ClientId", "TENCENTCLOUD_SECRET_ID"),
            ("ClientSecret", "TENCENTCLOUD_SECRET_KEY"),
        ],
    ),
    (
        "openstack",
        &[
            ("IdentityEndpoint", "OS_AUTH_URL"),
            ("Username", "OS_USERNAME"),
            ("Password", "OS_PASSWORD"),
            ("DomainName", "OS_DOMAIN_NAME"),
            ("ProjectID", "OS_PROJECT_NAME"),
        ],
    ),
];

/// Field mapping for a single provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSchema {
    entries: Vec<(String, String)>,
}

impl ProviderSchema {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(raw, target)| (raw.into(), target.into()))
                .collect(),
        }
    }

    /// Target field name for a raw field, if one is defined
    pub fn target_for(&self, raw_field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(raw, _)| raw == raw_field)
            .map(|(_, target)| target.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(raw, target)| (raw.as_str(), target.as_str()))
    }
}

/// Immutable provider → field mapping table.
///
/// A provider without an entry is valid: its credentials are passed through
/// under their original field names.
#[derive(Debug, Clone, Default)]
pub struct KeySchema {
    providers: HashMap<String, ProviderSchema>,
}

impl KeySchema {
    /// The cb-tumblebug → Terrarium table shipped with the tool
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_SCHEMA.iter().map(|(provider, fields)| {
            (provider.to_string(), ProviderSchema::new(fields.iter().copied()))
        }))
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, ProviderSchema)>,
    {
        Self {
            providers: entries.into_iter().collect(),
        }
    }

    pub fn provider(&self, provider: &str) -> Option<&ProviderSchema> {
        self.providers.get(provider)
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.providers.contains_key(provider)
    }

    /// Provider identifiers in sorted order
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
