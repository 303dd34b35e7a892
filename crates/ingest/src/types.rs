use std::io;
use std::path::PathBuf;

use serde::Serialize;

/// Summary of one full scan or one batch of incremental passes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    /// Well-formed JSON records handed to the sink.
    pub records_seen: usize,
    /// Records the sink recognised as usage events.
    pub events_found: usize,
    pub events_inserted: usize,
    pub bytes_read: u64,
    pub issues: Vec<IngestIssue>,
}

/// Non-fatal issues encountered during ingest.
#[derive(Debug, Clone, Serialize)]
pub struct IngestIssue {
    pub file_path: String,
    pub message: String,
}

impl IngestStats {
    pub(crate) fn push_issue(&mut self, file_path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(IngestIssue {
            file_path: file_path.into(),
            message: message.into(),
        });
    }
}

/// Errors emitted by the ingest pipeline.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("db error: {0}")]
    Db(#[from] tracker_db::DbError),
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
    #[error("watch root not found: {}", .0.display())]
    MissingRoot(PathBuf),
}

pub type Result<T> = std::result::Result<T, IngestError>;
