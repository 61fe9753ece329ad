// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Credential Import Service
//!
//! End-to-end registration pass:
//!
//! 1. **Preconditions**: bearer token present; OpenBao reachable,
//!    initialized and unsealed. Checked before the bundle is touched.
//! 2. **Bundle presence**: a missing bundle ends the phase with
//!    [`ImportSummary::BundleMissing`], which is not an error.
//! 3. **Decrypt**: [`CredentialDecryptor`]; failure is fatal.
//! 4. **Parse**: [`CredentialParser`]; failure is fatal.
//! 5. **Per provider**, in document order: [`KeyMapper`] then
//!    [`SecretRegistrar`]. Each provider ends as exactly one of
//!    `ok` / `skip` / `fail`; a failed write never stops the loop.
//!
//! Decrypted content and payloads stay in local variables for the duration
//! of the pass and are never logged.

use std::sync::Arc;
use tracing::{info, warn};

use crate::application::decryptor::{decrypt_blocking, CredentialDecryptor};
use crate::application::key_mapper::{KeyMapper, MappingResult};
use crate::application::registrar::SecretRegistrar;
use crate::domain::config::ImportConfig;
use crate::domain::credentials::{CredentialBundle, DecryptedContent};
use crate::domain::errors::{DecryptionError, ImportError, PreconditionError};
use crate::domain::key_schema::KeySchema;
use crate::domain::outcome::{ImportReport, ImportSummary, RegistrationOutcome};
use crate::domain::ports::{PassphrasePrompt, SecretStore};
use crate::infrastructure::credential_parser::CredentialParser;

pub const NO_VALUES_REASON: &str = "No credential values";

pub struct ImportService {
    config: Arc<ImportConfig>,
    schema: KeySchema,
    store: Arc<dyn SecretStore>,
    prompt: Arc<dyn PassphrasePrompt>,
    registrar: SecretRegistrar,
}

impl ImportService {
    pub fn new(
        config: Arc<ImportConfig>,
        schema: KeySchema,
        store: Arc<dyn SecretStore>,
        prompt: Arc<dyn PassphrasePrompt>,
    ) -> Self {
        let registrar = SecretRegistrar::new(
            store.clone(),
            config.store.mount.clone(),
            config.store.prefix.clone(),
        );
        Self {
            config,
            schema,
            store,
            prompt,
            registrar,
        }
    }

    pub fn bundle_present(&self) -> bool {
        self.config.credentials.bundle_path.is_file()
    }

    /// True when running now would ask the operator for a passphrase
    pub fn requires_prompt(&self) -> bool {
        self.bundle_present() && self.decryptor().requires_prompt()
    }

    pub async fn check_preconditions(&self) -> Result<(), PreconditionError> {
        if !self.config.store.has_token() {
            return Err(PreconditionError::MissingToken);
        }

        let status = self
            .store
            .seal_status()
            .await
            .map_err(|e| PreconditionError::Unreachable {
                address: self.config.store.address.clone(),
                reason: e.to_string(),
            })?;

        if !status.initialized {
            return Err(PreconditionError::Uninitialized);
        }
        if status.sealed {
            return Err(PreconditionError::Sealed);
        }
        Ok(())
    }

    pub async fn decrypt(&self) -> Result<DecryptedContent, DecryptionError> {
        decrypt_blocking(self.config.credentials.clone(), self.prompt.clone()).await
    }

    pub async fn run(&self) -> Result<ImportSummary, ImportError> {
        self.check_preconditions().await?;

        let bundle_path = &self.config.credentials.bundle_path;
        if !bundle_path.is_file() {
            warn!(path = %bundle_path.display(), "Encrypted credential bundle not found, skipping import");
            return Ok(ImportSummary::BundleMissing(bundle_path.clone()));
        }

        let content = self.decrypt().await?;
        info!(source = %content.key_source(), "Decryption successful");

        Ok(ImportSummary::Completed(self.register_content(content).await?))
    }

    /// Parse content decrypted ahead of time and register every provider.
    /// Preconditions are the caller's responsibility.
    pub async fn register_content(&self, content: DecryptedContent) -> Result<ImportReport, ImportError> {
        let bundle = CredentialParser::parse(&content)?;
        drop(content);
        Ok(self.register_all(&bundle).await)
    }

    /// Map and register every provider; one outcome per provider
    pub async fn register_all(&self, bundle: &CredentialBundle) -> ImportReport {
        let mapper = KeyMapper::new(&self.schema);
        let mut report = ImportReport::new();

        for (provider, credentials) in bundle.providers() {
            let outcome = match mapper.map(provider, credentials) {
                MappingResult::NothingToMap => RegistrationOutcome::Skip {
                    reason: NO_VALUES_REASON.to_string(),
                },
                MappingResult::Mapped {
                    strategy,
                    payload,
                    mapped_keys,
                } => {
                    tracing::debug!(provider, ?strategy, "Mapped credential fields");
                    match self.registrar.register(provider, &payload).await {
                        Ok(version) => RegistrationOutcome::Ok {
                            version,
                            mapped_keys,
                        },
                        Err(e) => RegistrationOutcome::Fail {
                            error: e.to_string(),
                        },
                    }
                }
            };
            info!(provider, outcome = outcome.label(), "Provider processed");
            report.push(provider, outcome);
        }

        let tally = report.tally();
        info!(
            registered = tally.registered,
            skipped = tally.skipped,
            failed = tally.failed,
            "Credential registration finished"
        );
        report
    }

    fn decryptor(&self) -> CredentialDecryptor<'_> {
        CredentialDecryptor::new(&self.config.credentials, self.prompt.as_ref())
    }
}
