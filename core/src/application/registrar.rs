// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Secret Registrar
//!
//! Writes one provider's normalized payload to `{mount}/{prefix}/{provider}`.
//! Every call creates a new KV version; nothing is diffed against the
//! previous one.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::credentials::NormalizedSecretPayload;
use crate::domain::errors::StoreError;
use crate::domain::ports::{SecretPath, SecretStore};

/// Per-provider write failure; always reported, never fatal to the run
pub type RegistrationError = StoreError;

pub struct SecretRegistrar {
    store: Arc<dyn SecretStore>,
    mount: String,
    prefix: String,
}

impl SecretRegistrar {
    pub fn new(store: Arc<dyn SecretStore>, mount: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            mount: mount.into(),
            prefix: prefix.into(),
        }
    }

    pub fn path_for(&self, provider: &str) -> SecretPath {
        SecretPath::for_provider(&self.mount, &self.prefix, provider)
    }

    /// Returns the new version, or `None` if the store did not report one
    pub async fn register(
        &self,
        provider: &str,
        payload: &NormalizedSecretPayload,
    ) -> Result<Option<u64>, RegistrationError> {
        let path = self.path_for(provider);
        debug!(provider, path = %path, keys = payload.len(), "Registering credential");

        self.store
            .write_secret(&path, payload)
            .await
            .inspect_err(|e| warn!(provider, path = %path, "Registration failed: {}", e))
    }
}
