//! Append-only thought journal.
//!
//! Every record goes to two sinks: an in-memory mirror used for statistics,
//! and a day-keyed NDJSON file under the journal directory. The file for a
//! record is chosen by [`journal_path`] from the record's own timestamp
//! (UTC calendar date), so rotation needs no mutable file-handle state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::mode::ThoughtMode;
use crate::thought::ThoughtRecord;

/// One line of the durable journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub input: String,
    pub output: String,
    pub mode: ThoughtMode,
    pub model: String,
}

impl LogEntry {
    pub fn from_record(record: &ThoughtRecord, model: &str) -> Self {
        Self {
            timestamp: record.timestamp,
            input: record.input.clone(),
            output: record.output.clone(),
            mode: record.mode,
            model: model.to_string(),
        }
    }
}

/// Journal file for records written on `date`.
pub fn journal_path_for_date(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("thoughts_{}.ndjson", date.format("%Y%m%d")))
}

/// Journal file for a record written at `at`.
pub fn journal_path(dir: &Path, at: DateTime<Utc>) -> PathBuf {
    journal_path_for_date(dir, at.date_naive())
}

/// In-memory and durable sink for thought records.
#[derive(Debug)]
pub struct ThoughtJournal {
    dir: Option<PathBuf>,
    records: RwLock<Vec<ThoughtRecord>>,
    // Serializes whole-line appends to the durable file.
    writer: Mutex<()>,
}

impl ThoughtJournal {
    /// Journal writing day files under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            records: RwLock::new(Vec::new()),
            writer: Mutex::new(()),
        }
    }

    /// Journal with the durable sink disabled.
    pub fn in_memory() -> Self {
        Self {
            dir: None,
            records: RwLock::new(Vec::new()),
            writer: Mutex::new(()),
        }
    }

    /// Directory of the durable sink, if enabled.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Record a thought in both sinks.
    ///
    /// Durable write failures are logged and dropped; they never reach the
    /// caller.
    pub fn record(&self, record: &ThoughtRecord, model: &str) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());

        let Some(dir) = &self.dir else {
            return;
        };

        let path = journal_path(dir, record.timestamp);
        if let Err(e) = self.append(&path, &LogEntry::from_record(record, model)) {
            warn!(path = %path.display(), error = %e, "Failed to append thought to journal");
        }
    }

    fn append(&self, path: &Path, entry: &LogEntry) -> io::Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())?;
        debug!(path = %path.display(), bytes = line.len(), "Appended journal line");
        Ok(())
    }

    /// Number of records held in memory.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every record held in memory.
    pub fn entries(&self) -> Vec<ThoughtRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read back the durable entries written on `date`.
    ///
    /// Returns an empty list when the durable sink is disabled or no file
    /// exists for that day.
    pub fn read_day(&self, date: NaiveDate) -> Result<Vec<LogEntry>> {
        let Some(dir) = &self.dir else {
            return Ok(Vec::new());
        };

        let path = journal_path_for_date(dir, date);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<LogEntry>(line).map_err(Error::from))
            .collect()
    }
}
