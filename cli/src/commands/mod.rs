// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Terrarium init CLI

pub mod init;

pub use self::init::{InitArgs, Phases};
