// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Console rendering
//!
//! Pure formatting helpers; the command decides where each string goes.

use colored::Colorize;
use std::fmt::Display;

use terrarium_core::application::BootstrapAction;
use terrarium_core::domain::config::ImportConfig;
use terrarium_core::domain::outcome::{ImportTally, ProviderOutcome, RegistrationOutcome};

use crate::commands::Phases;

const RULE_WIDTH: usize = 60;

pub fn banner(title: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("{}\n  {}\n{}\n", rule, title, rule)
        .bold()
        .cyan()
        .to_string()
}

pub fn configuration(config: &ImportConfig) -> String {
    let key_file = config
        .credentials
        .key_file
        .as_ref()
        .unwrap_or(&config.credentials.default_key_file);

    let mut out = format!("{}\n", "Configuration".yellow());
    out.push_str(&format!(" - {} {}\n", "VAULT_ADDR:".cyan(), config.store.address));
    out.push_str(&format!(
        " - {} {}\n",
        "CRED_FILE:".cyan(),
        config.credentials.bundle_path.display()
    ));
    out.push_str(&format!(" - {} {}\n", "KEY_FILE:".cyan(), key_file.display()));
    out
}

pub fn operations(phases: Phases) -> String {
    let mut out = format!("{}\n", "Operations to be performed:".yellow());
    let mut step = 1;
    if phases.openbao {
        out.push_str(&format!("  {}\n", format!("{}. Initialize / Unseal OpenBao", step).cyan()));
        step += 1;
    }
    if phases.credentials {
        out.push_str(&format!(
            "  {}\n",
            format!("{}. Register CSP credentials → OpenBao", step).cyan()
        ));
    }
    out
}

pub fn section(title: &str) -> String {
    format!("── {} ──", title).bold().to_string()
}

pub fn bootstrap_action(action: BootstrapAction) -> String {
    match action {
        BootstrapAction::Initialized => "OpenBao initialized (init-openbao.sh).".green().to_string(),
        BootstrapAction::Unsealed => "OpenBao unsealed (unseal-openbao.sh).".green().to_string(),
        BootstrapAction::AlreadyReady => "OpenBao is already initialized and unsealed."
            .green()
            .to_string(),
    }
}

/// `  OK   aws           v1  keys=[...]`
pub fn outcome_line(outcome: &ProviderOutcome) -> String {
    let label = match &outcome.outcome {
        RegistrationOutcome::Ok { .. } => "OK  ".green(),
        RegistrationOutcome::Skip { .. } => "SKIP".yellow(),
        RegistrationOutcome::Fail { .. } => "FAIL".red(),
    };
    format!("  {} {:12}  {}", label, outcome.provider, outcome.outcome)
}

pub fn tally_line(tally: ImportTally) -> String {
    format!(
        "Results: {}, {}, {}",
        format!("{} registered", tally.registered).green(),
        format!("{} skipped", tally.skipped).yellow(),
        format!("{} failed", tally.failed).red()
    )
}

/// Red error line, followed by the command that clears it when one is known
pub fn fatal(error: &dyn Display, remedy: Option<&str>) -> String {
    let mut out = error.to_string().red().to_string();
    if let Some(remedy) = remedy {
        out.push_str(&format!("\n{}\n  {}", "Run this first:".yellow(), remedy));
    }
    out
}

pub fn completion(elapsed_secs: u64) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "{}\n  Initialization complete! ({}s)\n{}\n",
        rule, elapsed_secs, rule
    )
    .bold()
    .green()
    .to_string()
}

/// How to read back what was just written
pub fn usage_hint(config: &ImportConfig) -> String {
    let store = &config.store;
    let address = store.address.trim_end_matches('/');
    format!(
        "To verify a credential:\n  source .env\n  curl -s -H \"X-Vault-Token: $VAULT_TOKEN\" {}/v1/{}/data/{}/aws | jq .data.data\n  bao kv get {}/{}/aws\n",
        address, store.mount, store.prefix, store.mount, store.prefix
    )
}
