use parking_lot::Mutex;
use tracker_db::Db;

use crate::parser::{RawRecord, usage_event_from_record};

/// What a sink did with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOutcome {
    /// A new usage event was persisted.
    Stored,
    /// The record was a usage event already present in the store.
    Duplicate,
    /// The record is not a usage event.
    Ignored,
    /// The record was a usage event but persisting it failed.
    Failed,
}

impl SinkOutcome {
    pub fn is_event(self) -> bool {
        !matches!(self, SinkOutcome::Ignored)
    }
}

/// Consumer of decoded log records. The ingestor calls `accept` once per
/// well-formed record, before any projection to a usage event.
pub trait RecordSink: Send + Sync {
    fn accept(&self, record: &RawRecord<'_>) -> SinkOutcome;
}

impl<F> RecordSink for F
where
    F: Fn(&RawRecord<'_>) -> SinkOutcome + Send + Sync,
{
    fn accept(&self, record: &RawRecord<'_>) -> SinkOutcome {
        self(record)
    }
}

/// Sink that projects records onto usage events and inserts them into the
/// event store.
pub struct StoreSink {
    db: Mutex<Db>,
}

impl StoreSink {
    pub fn new(db: Db) -> Self {
        Self { db: Mutex::new(db) }
    }
}

impl RecordSink for StoreSink {
    fn accept(&self, record: &RawRecord<'_>) -> SinkOutcome {
        let Some(event) = usage_event_from_record(record) else {
            return SinkOutcome::Ignored;
        };
        match self.db.lock().insert_usage_event(&event) {
            Ok(true) => SinkOutcome::Stored,
            Ok(false) => SinkOutcome::Duplicate,
            Err(err) => {
                tracing::warn!(
                    path = %record.path.display(),
                    timestamp = %event.timestamp,
                    error = %err,
                    "failed to store usage event"
                );
                SinkOutcome::Failed
            }
        }
    }
}
