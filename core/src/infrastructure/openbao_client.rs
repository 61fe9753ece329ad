// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OpenBao Secret Store Adapter
//
// Anti-Corruption Layer for the OpenBao (Vault-compatible) HTTP API:
// - GET  /v1/sys/seal-status
// - POST /v1/{mount}/data/{name}   (KV v2 write, creates a new version)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::config::StoreConfig;
use crate::domain::credentials::NormalizedSecretPayload;
use crate::domain::errors::StoreError;
use crate::domain::ports::{SealStatus, SecretPath, SecretStore};

pub struct OpenBaoClient {
    client: reqwest::Client,
    address: String,
    token: Option<String>,
    status_timeout: Duration,
    write_timeout: Duration,
}

#[derive(Serialize)]
struct KvWriteRequest<'a> {
    data: &'a NormalizedSecretPayload,
}

#[derive(Deserialize)]
struct KvWriteResponse {
    #[serde(default)]
    data: Option<KvWriteMetadata>,
}

#[derive(Deserialize)]
struct KvWriteMetadata {
    #[serde(default)]
    version: Option<u64>,
}

impl OpenBaoClient {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            address: config.address.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            status_timeout: config.status_timeout(),
            write_timeout: config.write_timeout(),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn url(&self, api_path: &str) -> String {
        format!("{}/v1/{}", self.address, api_path.trim_start_matches('/'))
    }
}

/// reqwest's Display stops at the top-level message; keep the whole chain
fn transport_error(e: reqwest::Error) -> StoreError {
    StoreError::Transport(format!("{:#}", anyhow::Error::from(e)))
}

#[async_trait]
impl SecretStore for OpenBaoClient {
    async fn seal_status(&self) -> Result<SealStatus, StoreError> {
        let response = self
            .client
            .get(self.url("sys/seal-status"))
            .timeout(self.status_timeout)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        response
            .json::<SealStatus>()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("seal-status: {}", e)))
    }

    async fn write_secret(
        &self,
        path: &SecretPath,
        payload: &NormalizedSecretPayload,
    ) -> Result<Option<u64>, StoreError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| StoreError::Transport("VAULT_TOKEN not set".to_string()))?;

        let response = self
            .client
            .post(self.url(&path.data_path()))
            .header("X-Vault-Token", token)
            .header("Content-Type", "application/json")
            .json(&KvWriteRequest { data: payload })
            .timeout(self.write_timeout)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status,
                body: body.trim().to_string(),
            });
        }

        // An unparsable body still means the write was accepted.
        let version = response
            .json::<KvWriteResponse>()
            .await
            .ok()
            .and_then(|r| r.data)
            .and_then(|d| d.version);

        tracing::debug!(path = %path, ?version, "KV secret written");
        Ok(version)
    }
}
