// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Errors
//!
//! Failure taxonomy of the import pipeline. Fatal kinds abort the run before
//! any provider is processed; per-provider kinds only ever become a `fail`
//! outcome.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Typed errors for every pipeline stage

use std::path::PathBuf;
use thiserror::Error;

/// Store not ready for registration (fatal)
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("Cannot reach OpenBao at {address}: {reason}")]
    Unreachable { address: String, reason: String },

    #[error("OpenBao is not initialized")]
    Uninitialized,

    #[error("OpenBao is sealed")]
    Sealed,

    #[error("VAULT_TOKEN not set")]
    MissingToken,
}

impl PreconditionError {
    /// Command the operator should run to clear the condition
    pub fn remedy(&self) -> &'static str {
        match self {
            PreconditionError::Unreachable { .. } => "docker compose up -d openbao",
            PreconditionError::Uninitialized => "./init/init-openbao.sh",
            PreconditionError::Sealed => "./init/unseal-openbao.sh",
            PreconditionError::MissingToken => "./init/init-openbao.sh",
        }
    }
}

/// Low-level bundle cipher failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("bad magic number: bundle is not an OpenSSL salted file")]
    MissingSaltHeader,

    #[error("ciphertext length {0} is not a positive multiple of the block size")]
    InvalidLength(usize),

    #[error("bad decrypt: wrong key or corrupted bundle")]
    BadDecrypt,

    #[error("decrypted content is not valid UTF-8")]
    InvalidUtf8,
}

/// No key source produced a usable plaintext (fatal to the registration phase)
#[derive(Debug, Error)]
pub enum DecryptionError {
    #[error("Failed to read encrypted bundle {path:?}: {source}")]
    BundleUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decrypt after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("Passphrase prompt failed: {0}")]
    Prompt(String),

    #[error("Decryption task did not complete: {0}")]
    Interrupted(String),
}

/// Decrypted content does not have the expected shape (fatal to the
/// registration phase)
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Error parsing credentials YAML: {0}")]
    InvalidYaml(String),

    #[error("Error parsing credentials YAML: missing '{0}' section")]
    MissingSection(&'static str),

    #[error("Error parsing credentials YAML: '{section}' must be a mapping")]
    NotAMapping { section: String },
}

/// A single provider's write failed (non-fatal)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response from OpenBao: {0}")]
    InvalidResponse(String),
}

/// External init/unseal step failed (fatal)
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to launch {script:?}: {source}")]
    Spawn {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{script} failed with exit code {code}")]
    Failed { script: String, code: i32 },

    #[error("{script} terminated by signal")]
    Terminated { script: String },
}

/// Fatal errors of an import run
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Decryption(#[from] DecryptionError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
