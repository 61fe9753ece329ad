// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Terrarium credential import core
//!
//! Decrypts a cb-tumblebug `credentials.yaml.enc` bundle, normalizes each
//! cloud provider's field names and registers the result into the OpenBao
//! KV v2 secret engine.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, import use cases and their adapters

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
