use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::paths::is_log_path;
use crate::sink::RecordSink;
use crate::tail::{FilePass, process_new_bytes};
use crate::tracker::OffsetTracker;
use crate::types::IngestStats;

/// Lists the log files under `root`. Symlinked files and directories are
/// never followed; walk errors are recorded as issues.
fn collect_log_files(root: &Path, stats: &mut IngestStats) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let file_path = err
                    .path()
                    .map(|path| path.to_string_lossy().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                stats.push_issue(file_path, err.to_string());
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_log_path(entry.path()) {
            continue;
        }
        files.push(entry.into_path());
    }
    files.sort();
    files
}

/// Runs one incremental pass over every log file under `root`.
///
/// Files are processed in parallel; a failure on one file is recorded and
/// does not stop the others. A missing root yields empty stats with a single
/// issue.
pub fn scan_directory(root: &Path, tracker: &OffsetTracker, sink: &dyn RecordSink) -> IngestStats {
    let mut stats = IngestStats::default();
    if !root.is_dir() {
        tracing::warn!(root = %root.display(), "log root not found, nothing to scan");
        stats.push_issue(root.to_string_lossy(), "log root not found");
        return stats;
    }

    let files = collect_log_files(root, &mut stats);
    let passes = files
        .par_iter()
        .map(|path| (path, process_new_bytes(path, tracker, sink)))
        .collect::<Vec<_>>();

    for (path, pass) in passes {
        stats.files_scanned += 1;
        match pass {
            Ok(pass) => merge_pass(&mut stats, &pass),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read log file");
                stats.files_skipped += 1;
                stats.push_issue(path.to_string_lossy(), err.to_string());
            }
        }
    }
    tracing::debug!(
        root = %root.display(),
        files = stats.files_scanned,
        inserted = stats.events_inserted,
        "scan finished"
    );
    stats
}

fn merge_pass(stats: &mut IngestStats, pass: &FilePass) {
    stats.bytes_read += pass.bytes_read;
    stats.records_seen += pass.records;
    stats.events_found += pass.events_found;
    stats.events_inserted += pass.events_inserted;
}
