// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Credential Decryptor
//!
//! Resolves the bundle key and decrypts the bundle. Sources are tried in
//! order, first success wins:
//!
//! 1. explicit key file (`--key-file`), if it exists
//! 2. `~/.cloud-barista/.tmp_enc_key`, if it exists
//! 3. interactive passphrase, `max_prompt_attempts` tries
//!
//! A key file that fails to decrypt falls through to the next source rather
//! than aborting, so a stale key file can be recovered from at the prompt.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Key resolution around the bundle cipher

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::config::CredentialsConfig;
use crate::domain::credentials::{DecryptedContent, KeySource};
use crate::domain::errors::DecryptionError;
use crate::domain::ports::PassphrasePrompt;
use crate::infrastructure::bundle_cipher;

pub struct CredentialDecryptor<'a> {
    config: &'a CredentialsConfig,
    prompt: &'a dyn PassphrasePrompt,
}

impl<'a> CredentialDecryptor<'a> {
    pub fn new(config: &'a CredentialsConfig, prompt: &'a dyn PassphrasePrompt) -> Self {
        Self { config, prompt }
    }

    /// True when no key file is available and the operator will be prompted
    pub fn requires_prompt(&self) -> bool {
        self.key_files().is_empty()
    }

    pub fn decrypt(&self) -> Result<DecryptedContent, DecryptionError> {
        let bundle_path = &self.config.bundle_path;
        let bundle = std::fs::read(bundle_path).map_err(|source| {
            DecryptionError::BundleUnreadable {
                path: bundle_path.clone(),
                source,
            }
        })?;

        for source in self.key_files() {
            let path = match &source {
                KeySource::ExplicitFile(path) | KeySource::DefaultFile(path) => path,
                KeySource::Prompt { .. } => continue,
            };
            let key = match read_key_file(path) {
                Ok(key) => key,
                Err(e) => {
                    warn!(path = %path.display(), "Failed to read key file: {}", e);
                    continue;
                }
            };

            info!(path = %path.display(), "Using key from file");
            match bundle_cipher::decrypt(&bundle, &key) {
                Ok(text) => return Ok(DecryptedContent::new(text, source)),
                Err(e) => warn!(path = %path.display(), "Decryption error: {}", e),
            }
        }

        let max_attempts = self.config.max_prompt_attempts;
        for attempt in 1..=max_attempts {
            let passphrase = self
                .prompt
                .read_passphrase(attempt, max_attempts)
                .map_err(|e| DecryptionError::Prompt(e.to_string()))?;

            match bundle_cipher::decrypt(&bundle, &passphrase) {
                Ok(text) => {
                    return Ok(DecryptedContent::new(text, KeySource::Prompt { attempt }))
                }
                Err(e) => warn!(attempt, max_attempts, "Decryption error: {}", e),
            }
        }

        Err(DecryptionError::Exhausted {
            attempts: max_attempts,
        })
    }

    fn key_files(&self) -> Vec<KeySource> {
        let mut sources = Vec::with_capacity(2);
        if let Some(explicit) = self.config.key_file.as_ref().filter(|p| p.is_file()) {
            sources.push(KeySource::ExplicitFile(explicit.clone()));
        }
        if self.config.default_key_file.is_file() {
            sources.push(KeySource::DefaultFile(self.config.default_key_file.clone()));
        }
        sources
    }
}

/// [`CredentialDecryptor::decrypt`] on tokio's blocking pool. The prompt
/// and key derivation stay off the runtime's worker threads, on either
/// runtime flavor.
pub async fn decrypt_blocking(
    config: CredentialsConfig,
    prompt: Arc<dyn PassphrasePrompt>,
) -> Result<DecryptedContent, DecryptionError> {
    tokio::task::spawn_blocking(move || CredentialDecryptor::new(&config, prompt.as_ref()).decrypt())
        .await
        .map_err(|e| DecryptionError::Interrupted(e.to_string()))?
}

fn read_key_file(path: &Path) -> std::io::Result<String> {
    Ok(std::fs::read_to_string(path)?.trim().to_string())
}
