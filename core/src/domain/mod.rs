// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Credential model, key schema, configuration and the ports the import
//! pipeline talks through.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Types shared by every import stage

pub mod config;
pub mod credentials;
pub mod errors;
pub mod key_schema;
pub mod outcome;
pub mod ports;
