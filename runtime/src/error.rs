// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy for application attempts.
//!
//! Browser-facing code returns `anyhow::Result`; the filler and the flow
//! navigator classify those errors into [`ApplyError`] so that every
//! outcome carries a human-readable reason.

use std::path::PathBuf;

/// Everything that can go wrong while driving one application attempt.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    #[error("control not found: {0}")]
    ControlNotFound(String),

    #[error("control not interactable: {control}: {reason}")]
    ControlNotInteractable { control: String, reason: String },

    #[error("navigation timed out after {timeout_ms}ms: {url}")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("navigation failed: {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("no resolvable application form: {0}")]
    UnresolvableForm(String),

    #[error("step limit exceeded after {steps} steps")]
    FlowExhausted { steps: u32 },

    #[error("control enumeration failed: {0}")]
    EnumerationFailed(String),

    #[error("resume file missing: {}", .0.display())]
    ResumeMissing(PathBuf),

    #[error("browser error: {0}")]
    Browser(String),
}

impl ApplyError {
    /// Recover a typed error from an `anyhow` chain, falling back to
    /// [`ApplyError::Browser`] with the rendered chain.
    pub fn classify(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ApplyError>() {
            Some(e) => e.clone(),
            None => Self::Browser(format!("{err:#}")),
        }
    }
}
