// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Init Command
//!
//! Runs the two phases of a Terrarium initialization:
//!
//! 1. **OpenBao** - check seal status, run `init-openbao.sh` or
//!    `unseal-openbao.sh` when needed, then reload `VAULT_TOKEN` from `.env`
//! 2. **Credentials** - decrypt the bundle, check the store is usable and
//!    register every provider
//!
//! The bundle is decrypted before anything else happens. When that needs a
//! passphrase, typing it is the operator's confirmation; otherwise the
//! command asks `Proceed?` unless `--yes` was given.
//!
//! # Exit codes
//!
//! - `0` - completed (provider failures are reported but not fatal)
//! - `1` - fatal error: unreachable/sealed store, missing token, decryption
//!   or parse failure
//! - `2` - `--strict` and at least one provider failed
//! - script exit code - an init/unseal script failed

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use terrarium_core::application::{
    decrypt_blocking, BootstrapError, CredentialDecryptor, ImportService, StoreBootstrapService,
};
use terrarium_core::domain::config::{expand_home, ImportConfig};
use terrarium_core::domain::credentials::{DecryptedContent, KeySource};
use terrarium_core::domain::errors::LifecycleError;
use terrarium_core::domain::key_schema::KeySchema;
use terrarium_core::domain::ports::PassphrasePrompt;
use terrarium_core::infrastructure::env_file;
use terrarium_core::infrastructure::{OpenBaoClient, ScriptLifecycleManager};

use crate::output;
use crate::prompt::{confirm_proceed, TerminalPrompt};

pub const EXIT_FATAL: i32 = 1;
pub const EXIT_PROVIDER_FAILURES: i32 = 2;

#[derive(Args, Debug, Clone, Default)]
pub struct InitArgs {
    /// Automatically proceed without confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Register CSP credentials only (skip OpenBao init/unseal)
    #[arg(long, visible_alias = "credentials")]
    pub credentials_only: bool,

    /// OpenBao init/unseal only (skip credential registration)
    #[arg(long, visible_alias = "openbao")]
    pub openbao_only: bool,

    /// Decryption key file (default: ~/.cloud-barista/.tmp_enc_key, then prompt)
    #[arg(long, value_name = "FILE")]
    pub key_file: Option<PathBuf>,

    /// Project directory holding `.env` and `init/` (default: .)
    #[arg(long, env = "TERRARIUM_PROJECT_DIR", value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Exit with status 2 if any provider failed to register
    #[arg(long)]
    pub strict: bool,
}

/// Which phases a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phases {
    pub openbao: bool,
    pub credentials: bool,
}

impl Phases {
    /// Neither flag means both phases; each `--*-only` flag adds its phase
    pub fn from_flags(credentials_only: bool, openbao_only: bool) -> Self {
        let all = !(credentials_only || openbao_only);
        Self {
            openbao: all || openbao_only,
            credentials: all || credentials_only,
        }
    }
}

/// defaults < `--config` file < environment < flags
pub fn build_config<F>(args: &InitArgs, config_path: Option<&Path>, lookup: F) -> Result<ImportConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config =
        ImportConfig::load_or_default(config_path).context("Failed to load configuration")?;
    config.apply_env_overrides(lookup);

    if let Some(key_file) = &args.key_file {
        config.credentials.key_file = Some(expand_home(key_file));
    }
    if let Some(dir) = &args.project_dir {
        config.project.dir = expand_home(dir);
    }

    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}

/// Pick up the token the init script wrote to the project's `.env`
pub fn reload_token(config: &mut ImportConfig) -> Result<bool> {
    let env_path = config.project.env_file_path();
    match env_file::read_vault_token(&env_path)? {
        Some(token) => {
            debug!(path = %env_path.display(), "Loaded VAULT_TOKEN from env file");
            config.store.token = Some(token);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Typing the passphrase already confirmed the run; a key file or a skipped
/// decryption still needs `Proceed?` unless `--yes` was given.
pub fn needs_confirmation(yes: bool, key_source: Option<&KeySource>) -> bool {
    !yes && !key_source.is_some_and(KeySource::is_interactive)
}

pub fn exit_code(has_failures: bool, strict: bool) -> i32 {
    if has_failures && strict {
        EXIT_PROVIDER_FAILURES
    } else {
        0
    }
}

pub async fn execute(args: InitArgs, config_path: Option<PathBuf>) -> Result<i32> {
    let mut config = build_config(&args, config_path.as_deref(), |key| std::env::var(key).ok())?;
    let phases = Phases::from_flags(args.credentials_only, args.openbao_only);
    debug!(?config, ?phases, "Resolved init configuration");

    println!("{}", output::banner("MC-Terrarium CSP Credential Registration"));
    println!("{}", output::configuration(&config));
    println!("{}", output::operations(phases));

    let prompt: Arc<dyn PassphrasePrompt> =
        Arc::new(TerminalPrompt::for_bundle(&config.credentials.bundle_path));

    let mut decrypted: Option<DecryptedContent> = None;
    if phases.credentials && config.credentials.bundle_path.is_file() {
        if CredentialDecryptor::new(&config.credentials, prompt.as_ref()).requires_prompt() {
            println!("{}", "Enter the credential password to proceed...".cyan());
        }
        println!("{}", "Decrypting credentials...".cyan());

        let content = match decrypt_blocking(config.credentials.clone(), prompt.clone()).await {
            Ok(content) => content,
            Err(e) => {
                eprintln!("{}", output::fatal(&e, None));
                return Ok(EXIT_FATAL);
            }
        };
        println!("{}", "Decryption successful!".green());
        println!();

        decrypted = Some(content);
    }

    let key_source = decrypted.as_ref().map(DecryptedContent::key_source);
    if needs_confirmation(args.yes, key_source) && !confirm_proceed()? {
        println!("{}", "Cancelled.".green());
        return Ok(0);
    }

    let started = Instant::now();

    if phases.openbao {
        println!("{}", output::section("OpenBao Initialization"));
        let store = Arc::new(
            OpenBaoClient::new(&config.store).context("Failed to create OpenBao client")?,
        );
        let lifecycle = Arc::new(ScriptLifecycleManager::from_config(&config.project));
        let bootstrap = StoreBootstrapService::new(store, lifecycle, config.store.address.clone());

        match bootstrap.ensure_ready().await {
            Ok(action) => println!("{}", output::bootstrap_action(action)),
            Err(BootstrapError::Precondition(e)) => {
                eprintln!("{}", output::fatal(&e, Some(e.remedy())));
                return Ok(EXIT_FATAL);
            }
            Err(BootstrapError::Lifecycle(e)) => {
                eprintln!("{}", output::fatal(&e, None));
                return Ok(match e {
                    LifecycleError::Failed { code, .. } => code,
                    _ => EXIT_FATAL,
                });
            }
        }
        println!();

        reload_token(&mut config)?;
    }

    let mut has_failures = false;
    if phases.credentials {
        println!("{}", output::section("CSP Credential Registration"));
        if !config.store.has_token() {
            reload_token(&mut config)?;
        }

        let config = Arc::new(config.clone());
        let store = Arc::new(
            OpenBaoClient::new(&config.store).context("Failed to create OpenBao client")?,
        );
        let service = ImportService::new(config.clone(), KeySchema::builtin(), store, prompt);

        if let Err(e) = service.check_preconditions().await {
            eprintln!("{}", output::fatal(&e, Some(e.remedy())));
            return Ok(EXIT_FATAL);
        }

        match decrypted {
            None => {
                println!(
                    "{}",
                    format!(
                        "Skipping: {} not found.",
                        config.credentials.bundle_path.display()
                    )
                    .yellow()
                );
                println!("{}", "Generate it using cb-tumblebug/init/encCredential.sh".yellow());
            }
            Some(content) => {
                println!("{}", "Registering credentials to OpenBao...".cyan());
                println!();

                let report = match service.register_content(content).await {
                    Ok(report) => report,
                    Err(e) => {
                        eprintln!("{}", output::fatal(&e, None));
                        return Ok(EXIT_FATAL);
                    }
                };

                for outcome in report.outcomes() {
                    println!("{}", output::outcome_line(outcome));
                }
                println!();
                println!("{}", output::tally_line(report.tally()));

                has_failures = report.has_failures();
                if has_failures {
                    println!("\n{}", "Some credentials failed to register.".red());
                }
            }
        }
        println!();
    }

    let elapsed = started.elapsed().as_secs();
    info!(elapsed_secs = elapsed, "Initialization complete");
    println!("{}", output::completion(elapsed));

    if phases.credentials {
        println!("{}", output::usage_hint(&config));
    }

    Ok(exit_code(has_failures, args.strict))
}
