// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Terminal prompts (dialoguer)

use anyhow::{Context, Result};
use dialoguer::{Confirm, Password};
use std::path::Path;

use terrarium_core::domain::ports::PassphrasePrompt;

/// Reads the bundle passphrase from the controlling terminal without echo
pub struct TerminalPrompt {
    bundle_name: String,
}

impl TerminalPrompt {
    pub fn for_bundle(bundle_path: &Path) -> Self {
        let bundle_name = bundle_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "credentials.yaml.enc".to_string());
        Self { bundle_name }
    }

    pub fn message(&self, attempt: u32, max_attempts: u32) -> String {
        format!(
            "Enter the password for {} (attempt {}/{})",
            self.bundle_name, attempt, max_attempts
        )
    }
}

impl PassphrasePrompt for TerminalPrompt {
    fn read_passphrase(&self, attempt: u32, max_attempts: u32) -> anyhow::Result<String> {
        Password::new()
            .with_prompt(self.message(attempt, max_attempts))
            .allow_empty_password(true)
            .interact()
            .context("Failed to read passphrase")
    }
}

/// `Proceed?` confirmation; anything but an explicit yes declines
pub fn confirm_proceed() -> Result<bool> {
    Confirm::new()
        .with_prompt("Proceed?")
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}
