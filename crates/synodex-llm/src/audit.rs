//! Audit logging for oracle calls.
//!
//! The oracle transport knows nothing about auditing; the pipeline hands
//! every prompt/output exchange to an injected append-only sink. The default
//! sink discards entries.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use synodex_common::Result;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleAuditEntry {
    pub id: Uuid,
    pub abstract_id: String,
    pub term: String,
    pub model: String,
    pub prompt: String,
    pub output: String,
    pub called_at: chrono::DateTime<Utc>,
}

impl OracleAuditEntry {
    pub fn new(
        abstract_id: impl Into<String>,
        term: impl Into<String>,
        model: impl Into<String>,
        prompt: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            abstract_id: abstract_id.into(),
            term: term.into(),
            model: model.into(),
            prompt: prompt.into(),
            output: output.into(),
            called_at: Utc::now(),
        }
    }
}

/// Append-only sink for oracle exchanges.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &OracleAuditEntry) -> Result<()>;
}

/// Discards all entries.
#[derive(Debug, Default)]
pub struct NullAuditSink;

impl AuditSink for NullAuditSink {
    fn record(&self, _entry: &OracleAuditEntry) -> Result<()> {
        Ok(())
    }
}

/// Appends one JSON object per line to a file.
#[derive(Debug)]
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, entry: &OracleAuditEntry) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let line = serde_json::to_string(entry)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}
