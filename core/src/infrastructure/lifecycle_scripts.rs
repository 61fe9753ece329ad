// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Lifecycle Scripts
//!
//! Runs the project's `init-openbao.sh` / `unseal-openbao.sh` as opaque
//! subprocesses. Output goes straight to the operator's terminal; only the
//! exit code is inspected.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::info;

use crate::domain::config::ProjectConfig;
use crate::domain::errors::LifecycleError;
use crate::domain::ports::StoreLifecycleManager;

pub struct ScriptLifecycleManager {
    working_dir: PathBuf,
    init_script: PathBuf,
    unseal_script: PathBuf,
}

impl ScriptLifecycleManager {
    pub fn new(working_dir: PathBuf, init_script: PathBuf, unseal_script: PathBuf) -> Self {
        Self {
            working_dir,
            init_script,
            unseal_script,
        }
    }

    pub fn from_config(project: &ProjectConfig) -> Self {
        Self::new(
            project.dir.clone(),
            project.init_script_path(),
            project.unseal_script_path(),
        )
    }

    async fn run(&self, script: &Path) -> Result<(), LifecycleError> {
        let name = script
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| script.display().to_string());

        // Resolved against our cwd, not the child's.
        let program = std::path::absolute(script).unwrap_or_else(|_| script.to_path_buf());

        info!(script = %program.display(), "Running lifecycle script");
        let status = Command::new(&program)
            .current_dir(&self.working_dir)
            .status()
            .await
            .map_err(|source| LifecycleError::Spawn {
                script: script.to_path_buf(),
                source,
            })?;

        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(LifecycleError::Failed { script: name, code }),
            None => Err(LifecycleError::Terminated { script: name }),
        }
    }
}

#[async_trait]
impl StoreLifecycleManager for ScriptLifecycleManager {
    async fn initialize(&self) -> Result<(), LifecycleError> {
        self.run(&self.init_script).await
    }

    async fn unseal(&self) -> Result<(), LifecycleError> {
        self.run(&self.unseal_script).await
    }
}
