// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Ports
//!
//! Interfaces the import pipeline depends on. Implementations live in
//! `crate::infrastructure` (OpenBao HTTP client, lifecycle scripts) and in
//! the CLI (terminal prompt); tests substitute in-memory fakes.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-corruption boundary around the secret store, its
//!   lifecycle tooling and the operator's terminal

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

use crate::domain::credentials::NormalizedSecretPayload;
use crate::domain::errors::{LifecycleError, StoreError};

/// `GET /v1/sys/seal-status` response (fields the pipeline uses)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SealStatus {
    pub initialized: bool,
    pub sealed: bool,
}

impl SealStatus {
    pub fn is_ready(&self) -> bool {
        self.initialized && !self.sealed
    }
}

/// KV v2 secret location: `{mount}/{name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretPath {
    pub mount: String,
    pub name: String,
}

impl SecretPath {
    /// `{mount}/{prefix}/{provider}`
    pub fn for_provider(mount: &str, prefix: &str, provider: &str) -> Self {
        let prefix = prefix.trim_matches('/');
        let name = if prefix.is_empty() {
            provider.to_string()
        } else {
            format!("{}/{}", prefix, provider)
        };
        Self {
            mount: mount.trim_matches('/').to_string(),
            name,
        }
    }

    /// API path below `/v1/` for writes (`{mount}/data/{name}`)
    pub fn data_path(&self) -> String {
        format!("{}/data/{}", self.mount, self.name)
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.mount, self.name)
    }
}

/// Versioned KV secret store
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Probe initialization / seal state
    async fn seal_status(&self) -> Result<SealStatus, StoreError>;

    /// Write a new version of the secret; returns the version when reported
    async fn write_secret(
        &self,
        path: &SecretPath,
        payload: &NormalizedSecretPayload,
    ) -> Result<Option<u64>, StoreError>;
}

/// Store bring-up steps delegated to external tooling
#[async_trait]
pub trait StoreLifecycleManager: Send + Sync {
    async fn initialize(&self) -> Result<(), LifecycleError>;
    async fn unseal(&self) -> Result<(), LifecycleError>;
}

/// Interactive passphrase entry for the encrypted bundle
pub trait PassphrasePrompt: Send + Sync {
    fn read_passphrase(&self, attempt: u32, max_attempts: u32) -> anyhow::Result<String>;
}
