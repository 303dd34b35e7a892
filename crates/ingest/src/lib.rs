mod ingestor;
mod parser;
mod paths;
mod scan;
mod sink;
mod tail;
mod tracker;
mod types;
mod watcher;

pub use ingestor::Ingestor;
pub use parser::{
    RawRecord, normalize_timestamp, parse_record_line, usage_event_from_line,
    usage_event_from_record,
};
pub use paths::{LOG_EXTENSION, default_claude_data_path, is_log_path, projects_dir};
pub use scan::scan_directory;
pub use sink::{RecordSink, SinkOutcome, StoreSink};
pub use tail::{FilePass, process_new_bytes};
pub use tracker::{FileCursor, OffsetTracker};
pub use types::{IngestError, IngestIssue, IngestStats, Result};
pub use watcher::{TailWatcher, WatchOptions};
