// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! Result logger: append-only storage of job records.
//!
//! Appends are fire-and-forget. A write failure is reported through
//! `tracing` and never reaches the caller, so an attempt's outcome does
//! not depend on the log being writable.

pub mod jsonl;

pub use jsonl::JsonlResultLog;

use crate::model::JobRecord;
use std::sync::Mutex;

pub trait ResultLog: Send + Sync {
    fn append(&self, record: &JobRecord);
}

/// Keeps records in memory. Used by tests and dry runs.
#[derive(Default)]
pub struct MemoryResultLog {
    records: Mutex<Vec<JobRecord>>,
}

impl MemoryResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<JobRecord> {
        self.records
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultLog for MemoryResultLog {
    fn append(&self, record: &JobRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}
