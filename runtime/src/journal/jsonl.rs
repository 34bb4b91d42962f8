// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

//! JSONL result log, one record per line.
//!
//! Rotates when the file exceeds `MAX_LOG_SIZE`; rotated files are named
//! `.1`, `.2`, ... up to `MAX_ROTATIONS`.

use super::ResultLog;
use crate::model::JobRecord;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Maximum log size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

const MAX_ROTATIONS: u32 = 5;

struct Inner {
    file: File,
    /// Approximate; re-read on open.
    current_size: u64,
}

pub struct JsonlResultLog {
    path: PathBuf,
    inner: Mutex<Inner>,
    max_size: u64,
}

impl JsonlResultLog {
    /// Open or create the log file, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_max_size(path, MAX_LOG_SIZE)
    }

    pub fn with_max_size(path: &Path, max_size: u64) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create log directory: {}", parent.display())
                })?;
            }
        }
        let file = open_append(path)?;
        let current_size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(Inner { file, current_size }),
            max_size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record from a log file, skipping malformed lines.
    pub fn read(path: &Path) -> Result<Vec<JobRecord>> {
        let file = File::open(path)
            .with_context(|| format!("failed to open result log: {}", path.display()))?;
        let mut records = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => debug!(line = n + 1, "skipping malformed log line: {e}"),
            }
        }
        Ok(records)
    }

    fn write(&self, record: &JobRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("result log lock poisoned"))?;

        if inner.current_size >= self.max_size {
            self.rotate(&mut inner)?;
        }

        writeln!(inner.file, "{json}")?;
        inner.file.flush()?;
        inner.current_size += json.len() as u64 + 1;
        Ok(())
    }

    /// applications.jsonl → applications.jsonl.1, .1 → .2, ...
    fn rotate(&self, inner: &mut Inner) -> Result<()> {
        inner.file.flush()?;

        let oldest = rotation_path(&self.path, MAX_ROTATIONS);
        if oldest.exists() {
            let _ = std::fs::remove_file(&oldest);
        }
        for i in (1..MAX_ROTATIONS).rev() {
            let from = rotation_path(&self.path, i);
            if from.exists() {
                let _ = std::fs::rename(&from, rotation_path(&self.path, i + 1));
            }
        }
        let _ = std::fs::rename(&self.path, rotation_path(&self.path, 1));

        inner.file = open_append(&self.path).context("failed to reopen result log after rotation")?;
        inner.current_size = 0;
        debug!(path = %self.path.display(), "rotated result log");
        Ok(())
    }
}

impl ResultLog for JsonlResultLog {
    fn append(&self, record: &JobRecord) {
        if let Err(e) = self.write(record) {
            warn!(
                path = %self.path.display(),
                title = %record.title,
                company = %record.company,
                "failed to append job record: {e:#}"
            );
        }
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open result log: {}", path.display()))
}

fn rotation_path(base: &Path, index: u32) -> PathBuf {
    let name = format!(
        "{}.{index}",
        base.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("applications.jsonl")
    );
    base.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApplicationStatus, Listing, Platform};

    fn record(title: &str) -> JobRecord {
        Listing::new(title, "Acme", "https://acme.example/apply", Platform::Greenhouse)
            .record(ApplicationStatus::Applied, "Application submitted successfully")
    }

    #[test]
    fn test_append_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("applications.jsonl");
        let log = JsonlResultLog::open(&path).unwrap();

        log.append(&record("Backend Engineer"));
        log.append(&record("Platform Engineer"));

        let records = JsonlResultLog::read(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Backend Engineer");
        assert_eq!(records[1].status, ApplicationStatus::Applied);
    }

    #[test]
    fn test_reopen_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applications.jsonl");
        JsonlResultLog::open(&path).unwrap().append(&record("A"));
        JsonlResultLog::open(&path).unwrap().append(&record("B"));
        assert_eq!(JsonlResultLog::read(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_rotation_moves_full_file_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applications.jsonl");
        let log = JsonlResultLog::with_max_size(&path, 10).unwrap();

        log.append(&record("first"));
        log.append(&record("second"));

        let rotated = JsonlResultLog::read(&rotation_path(&path, 1)).unwrap();
        let current = JsonlResultLog::read(&path).unwrap();
        assert_eq!(rotated[0].title, "first");
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].title, "second");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applications.jsonl");
        std::fs::write(&path, "not json\n\n").unwrap();
        JsonlResultLog::open(&path).unwrap().append(&record("ok"));
        let records = JsonlResultLog::read(&path).unwrap();
        assert_eq!(records.len(), 1);
    }
}
