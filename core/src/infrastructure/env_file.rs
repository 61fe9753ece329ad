// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! `.env` token loader
//!
//! `init-openbao.sh` writes the root token to the project's `.env` file.
//! Only `VAULT_TOKEN` is read, and the process environment is left alone.

use anyhow::Context;
use std::path::Path;

const TOKEN_KEY: &str = "VAULT_TOKEN";

/// `VAULT_TOKEN` from a dotenv file; `Ok(None)` if the file or key is absent
pub fn read_vault_token(path: &Path) -> anyhow::Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }

    let entries = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open env file {:?}", path))?;

    let mut token = None;
    for entry in entries {
        let (key, value) = entry.with_context(|| format!("Failed to parse env file {:?}", path))?;
        if key == TOKEN_KEY {
            let value = value.trim().to_string();
            token = (!value.is_empty()).then_some(value);
        }
    }
    Ok(token)
}
