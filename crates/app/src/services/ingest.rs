use std::sync::Arc;

use ingest::{IngestError, IngestStats, Ingestor, StoreSink, TailWatcher};
use parking_lot::Mutex;
use tracker_core::{ImportStatus, RefreshResult, StatusReport};
use tracker_db::Db;

use crate::error::Result;
use crate::services::{SharedConfig, SharedQuota, open_db};

/// Owns the ingestor, the live watcher and the background import progress.
/// Clones share all three.
#[derive(Clone)]
pub struct IngestService {
    config: SharedConfig,
    quota: SharedQuota,
    ingestor: Arc<Mutex<Option<Ingestor>>>,
    watcher: Arc<Mutex<Option<TailWatcher>>>,
    status: Arc<Mutex<ImportStatus>>,
}

impl IngestService {
    pub(super) fn new(config: SharedConfig, quota: SharedQuota) -> Self {
        Self {
            config,
            quota,
            ingestor: Arc::new(Mutex::new(None)),
            watcher: Arc::new(Mutex::new(None)),
            status: Arc::new(Mutex::new(ImportStatus::default())),
        }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// The shared ingestor, created on first use with its own store
    /// connection.
    fn ingestor(&self) -> Result<Ingestor> {
        let mut slot = self.ingestor.lock();
        if let Some(ingestor) = slot.as_ref() {
            return Ok(ingestor.clone());
        }
        let sink = Arc::new(StoreSink::new(self.db()?));
        let ingestor = Ingestor::new(self.config.projects_dir(), sink);
        *slot = Some(ingestor.clone());
        Ok(ingestor)
    }

    /// Scans every log file under the projects directory.
    pub fn run(&self) -> Result<IngestStats> {
        let ingestor = self.ingestor()?;
        let stats = ingestor.full_scan();
        tracing::info!(
            root = %ingestor.root().display(),
            files = stats.files_scanned,
            skipped = stats.files_skipped,
            found = stats.events_found,
            inserted = stats.events_inserted,
            "scan finished"
        );
        Ok(stats)
    }

    /// Full scan that records its progress for [`Self::import_status`].
    pub fn background_import(&self) -> Result<IngestStats> {
        *self.status.lock() = ImportStatus {
            running: true,
            ..ImportStatus::default()
        };
        let result = self.run();
        let mut status = self.status.lock();
        status.running = false;
        status.completed = true;
        if let Ok(stats) = &result {
            status.new_records = stats.events_inserted;
            status.total_processed = stats.events_found;
        }
        result
    }

    pub fn import_status(&self) -> ImportStatus {
        *self.status.lock()
    }

    /// Starts the watcher unless it is already running. Returns whether a
    /// watcher is active afterwards; a projects directory that does not
    /// exist yet is not an error.
    pub fn start_watcher(&self) -> Result<bool> {
        let mut slot = self.watcher.lock();
        if slot.as_ref().is_some_and(TailWatcher::is_running) {
            return Ok(true);
        }
        let ingestor = self.ingestor()?;
        match ingestor.watch(self.config.watch_options()) {
            Ok(watcher) => {
                tracing::info!(root = %watcher.root().display(), "watching for log changes");
                *slot = Some(watcher);
                Ok(true)
            }
            Err(IngestError::MissingRoot(root)) => {
                tracing::warn!(root = %root.display(), "projects directory missing, watcher not started");
                *slot = None;
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn stop_watcher(&self) {
        if let Some(mut watcher) = self.watcher.lock().take() {
            watcher.stop();
            tracing::info!("watcher stopped");
        }
    }

    pub fn watcher_active(&self) -> bool {
        self.watcher
            .lock()
            .as_ref()
            .is_some_and(TailWatcher::is_running)
    }

    /// Rescans, retries the watcher if it is not running, drops the cached
    /// quota so the next read fetches it again, and reports the stored record
    /// count.
    pub fn refresh(&self) -> Result<RefreshResult> {
        self.quota.invalidate();
        let stats = self.run()?;
        let watcher_active = self.start_watcher()?;
        let total_in_db = self.db()?.record_count()?;
        Ok(RefreshResult {
            new_records: stats.events_inserted,
            total_processed: stats.events_found,
            total_in_db,
            watcher_active,
        })
    }

    pub fn status(&self) -> Result<StatusReport> {
        let total_records = self.db()?.record_count()?;
        Ok(StatusReport {
            watcher_active: self.watcher_active(),
            db_path: self.config.db_path.display().to_string(),
            claude_data_path: self.config.claude_data_path.display().to_string(),
            total_records,
            import_status: self.import_status(),
        })
    }
}
