use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::scan::scan_directory;
use crate::sink::RecordSink;
use crate::tail::{FilePass, process_new_bytes};
use crate::tracker::OffsetTracker;
use crate::types::{IngestStats, Result};
use crate::watcher::{TailWatcher, WatchOptions};

/// Ties a log root, an offset tracker and a record sink together. Clones
/// share the same tracker and sink, so a manual rescan and the watcher never
/// re-read bytes the other already consumed.
#[derive(Clone)]
pub struct Ingestor {
    root: PathBuf,
    tracker: Arc<OffsetTracker>,
    sink: Arc<dyn RecordSink>,
}

impl Ingestor {
    pub fn new(root: impl Into<PathBuf>, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            root: root.into(),
            tracker: Arc::new(OffsetTracker::new()),
            sink,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tracker(&self) -> &OffsetTracker {
        &self.tracker
    }

    pub fn full_scan(&self) -> IngestStats {
        scan_directory(&self.root, &self.tracker, self.sink.as_ref())
    }

    pub fn process_file(&self, path: &Path) -> io::Result<FilePass> {
        process_new_bytes(path, &self.tracker, self.sink.as_ref())
    }

    /// Subscribes to changes under the root. Fails with
    /// [`IngestError::MissingRoot`](crate::IngestError::MissingRoot) when the
    /// root does not exist yet.
    pub fn watch(&self, options: WatchOptions) -> Result<TailWatcher> {
        TailWatcher::start(&self.root, self.tracker.clone(), self.sink.clone(), options)
    }
}
