// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Terrarium init CLI library - exposes testable components
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Flag handling, terminal prompts and console rendering around
//!   `terrarium-core`

pub mod commands;
pub mod output;
pub mod prompt;
