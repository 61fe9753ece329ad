// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod bootstrap;
pub mod decryptor;
pub mod import_service;
pub mod key_mapper;
pub mod registrar;

// Re-export use cases for convenience
pub use bootstrap::{BootstrapAction, BootstrapError, StoreBootstrapService};
pub use decryptor::{decrypt_blocking, CredentialDecryptor};
pub use import_service::ImportService;
pub use key_mapper::{KeyMapper, MappingResult, MappingStrategy};
pub use registrar::{RegistrationError, SecretRegistrar};
