use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, TrySendError, sync_channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::paths::{is_log_path, reachable_without_links};
use crate::sink::RecordSink;
use crate::tail::process_new_bytes;
use crate::tracker::OffsetTracker;
use crate::types::{IngestError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Worker threads draining notifications.
    pub workers: usize,
    /// Pending paths per worker before notifications are dropped.
    pub queue_capacity: usize,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_capacity: 256,
        }
    }
}

/// Recursive file-notification subscription that tails every log file it
/// hears about.
///
/// Notifications are routed to a fixed pool of workers through bounded
/// queues. A path always hashes to the same worker, so passes over one file
/// run in notification order. When a queue is full the notification is
/// dropped; the next write or full scan picks the bytes up.
pub struct TailWatcher {
    root: PathBuf,
    watcher: Option<RecommendedWatcher>,
    workers: Vec<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl TailWatcher {
    pub fn start(
        root: &Path,
        tracker: Arc<OffsetTracker>,
        sink: Arc<dyn RecordSink>,
        options: WatchOptions,
    ) -> Result<Self> {
        if !root.is_dir() {
            return Err(IngestError::MissingRoot(root.to_path_buf()));
        }
        let worker_count = options.workers.max(1);
        let capacity = options.queue_capacity.max(1);

        let mut senders = Vec::with_capacity(worker_count);
        let mut receivers = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let (tx, rx) = sync_channel::<PathBuf>(capacity);
            senders.push(tx);
            receivers.push(rx);
        }

        let handler_root = root.to_path_buf();
        let handler_tracker = tracker.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => dispatch(&handler_root, &handler_tracker, &senders, event),
                Err(err) => tracing::warn!(error = %err, "file watch error"),
            }
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;

        let mut tail = Self {
            root: root.to_path_buf(),
            watcher: Some(watcher),
            workers: Vec::with_capacity(worker_count),
            stop: Arc::new(AtomicBool::new(false)),
        };
        for (index, rx) in receivers.into_iter().enumerate() {
            let tracker = tracker.clone();
            let sink = sink.clone();
            let stop = tail.stop.clone();
            let handle = thread::Builder::new()
                .name(format!("tail-worker-{index}"))
                .spawn(move || run_worker(rx, &tracker, sink.as_ref(), &stop))?;
            tail.workers.push(handle);
        }
        tracing::info!(root = %root.display(), workers = worker_count, "watching for log changes");
        Ok(tail)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_running(&self) -> bool {
        self.watcher.is_some()
    }

    /// Unsubscribes and waits for the workers to finish their current pass.
    pub fn stop(&mut self) {
        if self.watcher.is_none() && self.workers.is_empty() {
            return;
        }
        self.stop.store(true, Ordering::SeqCst);
        // Dropping the watcher drops the senders, which disconnects idle workers.
        drop(self.watcher.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("tail worker panicked");
            }
        }
        tracing::info!(root = %self.root.display(), "stopped watching");
    }
}

impl Drop for TailWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn dispatch(root: &Path, tracker: &OffsetTracker, senders: &[SyncSender<PathBuf>], event: Event) {
    match event.kind {
        EventKind::Remove(_) => {
            for path in event.paths.iter().filter(|path| is_log_path(path)) {
                tracker.forget(path);
            }
        }
        EventKind::Create(_) | EventKind::Modify(_) => {
            for path in event.paths {
                if !is_log_path(&path) || !reachable_without_links(root, &path) {
                    continue;
                }
                let worker = worker_for(&path, senders.len());
                match senders[worker].try_send(path) {
                    Ok(()) => {}
                    Err(TrySendError::Full(path)) => {
                        tracing::debug!(path = %path.display(), "watch queue full, dropping notification");
                    }
                    Err(TrySendError::Disconnected(_)) => {}
                }
            }
        }
        _ => {}
    }
}

fn worker_for(path: &Path, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    (hasher.finish() % workers as u64) as usize
}

fn run_worker(rx: Receiver<PathBuf>, tracker: &OffsetTracker, sink: &dyn RecordSink, stop: &AtomicBool) {
    loop {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        let path = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(path) => path,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        match process_new_bytes(&path, tracker, sink) {
            Ok(pass) if pass.records > 0 => tracing::debug!(
                path = %path.display(),
                records = pass.records,
                inserted = pass.events_inserted,
                offset = pass.end_offset,
                "tailed log file"
            ),
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => tracker.forget(&path),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to tail log file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_routing_is_stable_per_path() {
        let path = Path::new("/tmp/projects/demo/a.jsonl");
        let first = worker_for(path, 4);
        for _ in 0..10 {
            assert_eq!(worker_for(path, 4), first);
        }
        assert!(first < 4);
        assert_eq!(worker_for(path, 1), 0);
    }

    #[test]
    fn missing_root_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("projects");
        let sink: Arc<dyn RecordSink> =
            Arc::new(|_: &crate::parser::RawRecord<'_>| crate::sink::SinkOutcome::Ignored);
        let err = match TailWatcher::start(
            &missing,
            Arc::new(OffsetTracker::new()),
            sink,
            WatchOptions::default(),
        ) {
            Ok(_) => panic!("watcher started on a missing root"),
            Err(err) => err,
        };
        assert!(matches!(err, IngestError::MissingRoot(path) if path == missing));
    }
}
