use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

/// Read progress of one log file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileCursor {
    /// Always the end of the last complete line consumed.
    pub byte_offset: u64,
    /// Inode observed when the cursor was last checked (unix only).
    pub inode: Option<u64>,
}

/// In-memory map of per-file read offsets shared by the scanner and the
/// watcher. Nothing is persisted; after a restart every file is re-read from
/// offset 0 and the store's natural key absorbs the duplicates.
#[derive(Debug, Default)]
pub struct OffsetTracker {
    cursors: Mutex<HashMap<PathBuf, FileCursor>>,
    file_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl OffsetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last consumed offset, 0 for files never seen.
    pub fn position(&self, path: &Path) -> u64 {
        self.cursors
            .lock()
            .get(path)
            .map(|cursor| cursor.byte_offset)
            .unwrap_or(0)
    }

    pub fn cursor(&self, path: &Path) -> Option<FileCursor> {
        self.cursors.lock().get(path).copied()
    }

    /// Moves the offset forward. Regressions are ignored; returns the offset
    /// in effect afterwards.
    pub fn advance(&self, path: &Path, offset: u64) -> u64 {
        let mut cursors = self.cursors.lock();
        let cursor = cursors.entry(path.to_path_buf()).or_default();
        if offset > cursor.byte_offset {
            cursor.byte_offset = offset;
        }
        cursor.byte_offset
    }

    /// Drops the cursor and pass lock of a deleted file.
    pub fn forget(&self, path: &Path) {
        self.cursors.lock().remove(path);
        self.file_locks.lock().remove(path);
    }

    pub fn len(&self) -> usize {
        self.cursors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset to resume reading from, given the file's current length and
    /// inode. A file that shrank below its cursor or whose inode changed was
    /// truncated or replaced; its cursor restarts at 0. Returns the offset and
    /// whether a reset happened.
    pub(crate) fn resume_offset(&self, path: &Path, file_len: u64, inode: Option<u64>) -> (u64, bool) {
        let mut cursors = self.cursors.lock();
        let cursor = cursors.entry(path.to_path_buf()).or_default();
        let replaced = matches!((cursor.inode, inode), (Some(seen), Some(now)) if seen != now);
        let reset = replaced || cursor.byte_offset > file_len;
        if reset {
            cursor.byte_offset = 0;
        }
        cursor.inode = inode;
        (cursor.byte_offset, reset)
    }

    /// Lock serializing read-and-advance passes over one file.
    pub(crate) fn file_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        self.file_locks
            .lock()
            .entry(path.to_path_buf())
            .or_default()
            .clone()
    }
}
