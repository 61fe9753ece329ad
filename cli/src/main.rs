// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # MC-Terrarium Init CLI
//!
//! The `terrarium-init` binary prepares a Terrarium deployment:
//!
//! 1. Initialize or unseal OpenBao through the project's init scripts
//! 2. Decrypt the cb-tumblebug credential bundle and register each CSP's
//!    credentials under `secret/csp/{provider}`
//!
//! ## Usage
//!
//! - `terrarium-init` - full initialization (interactive)
//! - `terrarium-init -y` - non-interactive
//! - `terrarium-init --credentials-only` - credential import only
//! - `terrarium-init --openbao-only` - OpenBao init/unseal only
//! - `terrarium-init --key-file ~/.cloud-barista/.tmp_enc_key`

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use terrarium_init::commands::{self, InitArgs};

/// Initialize MC-Terrarium: OpenBao setup and CSP credential import
#[derive(Parser)]
#[command(name = "terrarium-init")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    init: InitArgs,

    /// Path to configuration file
    #[arg(short, long, env = "TERRARIUM_CONFIG_PATH", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TERRARIUM_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli.log_level)?;

    let code = commands::init::execute(cli.init, cli.config).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
