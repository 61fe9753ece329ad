// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Registration outcomes and the run-level tally.

use std::fmt;
use std::path::PathBuf;

/// Result of one provider's pass through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Written; `version` is `None` when the store did not report one
    Ok {
        version: Option<u64>,
        mapped_keys: Vec<String>,
    },
    Skip { reason: String },
    Fail { error: String },
}

impl RegistrationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RegistrationOutcome::Ok { .. } => "OK",
            RegistrationOutcome::Skip { .. } => "SKIP",
            RegistrationOutcome::Fail { .. } => "FAIL",
        }
    }
}

impl fmt::Display for RegistrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationOutcome::Ok { version, mapped_keys } => {
                match version {
                    Some(v) => write!(f, "v{}", v)?,
                    None => write!(f, "v?")?,
                }
                write!(f, "  keys=[{}]", mapped_keys.join(", "))
            }
            RegistrationOutcome::Skip { reason } => write!(f, "({})", reason),
            RegistrationOutcome::Fail { error } => write!(f, "{}", error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOutcome {
    pub provider: String,
    pub outcome: RegistrationOutcome,
}

/// Counts of outcomes by kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportTally {
    pub registered: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportTally {
    pub fn record(&mut self, outcome: &RegistrationOutcome) {
        match outcome {
            RegistrationOutcome::Ok { .. } => self.registered += 1,
            RegistrationOutcome::Skip { .. } => self.skipped += 1,
            RegistrationOutcome::Fail { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.registered + self.skipped + self.failed
    }
}

/// Per-provider outcomes of a completed registration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    outcomes: Vec<ProviderOutcome>,
    tally: ImportTally,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, provider: impl Into<String>, outcome: RegistrationOutcome) {
        self.tally.record(&outcome);
        self.outcomes.push(ProviderOutcome {
            provider: provider.into(),
            outcome,
        });
    }

    pub fn outcomes(&self) -> &[ProviderOutcome] {
        &self.outcomes
    }

    pub fn outcome_for(&self, provider: &str) -> Option<&RegistrationOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.provider == provider)
            .map(|o| &o.outcome)
    }

    pub fn tally(&self) -> ImportTally {
        self.tally
    }

    pub fn has_failures(&self) -> bool {
        self.tally.failed > 0
    }
}

/// What the registration phase ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSummary {
    /// No bundle on disk; nothing to import
    BundleMissing(PathBuf),
    Completed(ImportReport),
}
