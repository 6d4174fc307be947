// SPDX-FileCopyrightText: 2026 Askdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only CSV interaction log.
//!
//! One headerless row per turn: `datetime, thread_id, question, answer`.
//! Fields are quoted by the `csv` crate so commas and newlines inside
//! questions and answers survive a round trip.
//!
//! All writes go through a single async mutex and run on the blocking pool,
//! so concurrent requests never interleave partial rows.

use std::collections::{HashSet, VecDeque};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use askdesk_core::traits::{InteractionLog, PluginAdapter};
use askdesk_core::types::{AdapterType, HealthStatus, LogRecord, StatsReport};
use askdesk_core::AskdeskError;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// CSV-backed [`InteractionLog`].
#[derive(Debug, Clone)]
pub struct CsvLedger {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PluginAdapter for CsvLedger {
    fn name(&self) -> &str {
        "csv-ledger"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Ledger
    }

    async fn health_check(&self) -> Result<HealthStatus, AskdeskError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if parent.is_dir() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(format!(
                "log directory {} does not exist",
                parent.display()
            )))
        }
    }
}

#[async_trait]
impl InteractionLog for CsvLedger {
    async fn append(&self, record: &LogRecord) -> Result<(), AskdeskError> {
        let _guard = self.write_lock.lock().await;
        let path = Arc::clone(&self.path);
        let record = record.clone();

        tokio::task::spawn_blocking(move || append_row(&path, &record))
            .await
            .map_err(AskdeskError::logging)?
            .map_err(AskdeskError::logging)?;

        debug!(path = %self.path.display(), "interaction logged");
        Ok(())
    }

    async fn stats(&self, recent_limit: usize) -> Result<StatsReport, AskdeskError> {
        let _guard = self.write_lock.lock().await;
        let path = Arc::clone(&self.path);

        tokio::task::spawn_blocking(move || read_report(&path, recent_limit))
            .await
            .map_err(AskdeskError::logging)?
            .map_err(AskdeskError::logging)
    }
}

/// Appends one row, creating the file if needed.
fn append_row(path: &Path, record: &LogRecord) -> Result<(), csv::Error> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record([
        record.timestamp.as_str(),
        record.thread_id.as_str(),
        record.question.as_str(),
        record.answer.as_str(),
    ])?;
    writer.flush()?;
    Ok(())
}

/// Reads the whole log into a [`StatsReport`].
///
/// A missing file is an empty log. Short rows are padded with empty fields.
fn read_report(path: &Path, recent_limit: usize) -> Result<StatsReport, csv::Error> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StatsReport::default()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut threads = HashSet::new();
    let mut total = 0usize;
    let mut recent = VecDeque::with_capacity(recent_limit);

    for row in reader.records() {
        let row = row?;
        let field = |i: usize| row.get(i).unwrap_or_default().to_string();
        let record = LogRecord {
            timestamp: field(0),
            thread_id: field(1),
            question: field(2),
            answer: field(3),
        };

        total += 1;
        threads.insert(record.thread_id.clone());
        if recent_limit > 0 {
            if recent.len() == recent_limit {
                recent.pop_front();
            }
            recent.push_back(record);
        }
    }

    Ok(StatsReport {
        distinct_threads: threads.len(),
        total_questions: total,
        recent: recent.into(),
    })
}
