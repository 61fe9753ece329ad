// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Store Bootstrap
//!
//! Brings OpenBao to an initialized, unsealed state before credentials are
//! registered. The actual init/unseal work is delegated to a
//! [`StoreLifecycleManager`]; this service only decides which step to run.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::domain::errors::{LifecycleError, PreconditionError};
use crate::domain::ports::{SecretStore, StoreLifecycleManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapAction {
    Initialized,
    Unsealed,
    AlreadyReady,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

pub struct StoreBootstrapService {
    store: Arc<dyn SecretStore>,
    lifecycle: Arc<dyn StoreLifecycleManager>,
    address: String,
}

impl StoreBootstrapService {
    pub fn new(
        store: Arc<dyn SecretStore>,
        lifecycle: Arc<dyn StoreLifecycleManager>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            store,
            lifecycle,
            address: address.into(),
        }
    }

    pub async fn ensure_ready(&self) -> Result<BootstrapAction, BootstrapError> {
        let status = self
            .store
            .seal_status()
            .await
            .map_err(|e| PreconditionError::Unreachable {
                address: self.address.clone(),
                reason: e.to_string(),
            })?;

        if !status.initialized {
            info!("OpenBao not yet initialized, running init");
            self.lifecycle.initialize().await?;
            Ok(BootstrapAction::Initialized)
        } else if status.sealed {
            info!("OpenBao is sealed, running unseal");
            self.lifecycle.unseal().await?;
            Ok(BootstrapAction::Unsealed)
        } else {
            info!("OpenBao is already initialized and unsealed");
            Ok(BootstrapAction::AlreadyReady)
        }
    }
}
