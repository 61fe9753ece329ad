// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod bundle_cipher;
pub mod credential_parser;
pub mod env_file;
pub mod lifecycle_scripts;
pub mod openbao_client;

pub use credential_parser::CredentialParser;
pub use lifecycle_scripts::ScriptLifecycleManager;
pub use openbao_client::OpenBaoClient;
