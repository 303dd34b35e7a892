use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::parser::{RawRecord, parse_record_line};
use crate::sink::{RecordSink, SinkOutcome};
use crate::tracker::OffsetTracker;

/// Result of one read pass over a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilePass {
    pub start_offset: u64,
    pub end_offset: u64,
    pub bytes_read: u64,
    pub records: usize,
    pub events_found: usize,
    pub events_inserted: usize,
    /// The stored offset was discarded because the file shrank or was replaced.
    pub reset: bool,
}

/// Reads every line appended to `path` since its tracked offset and hands
/// each decoded record to `sink`.
///
/// The offset only ever moves to the end of a newline-terminated line. A
/// trailing line without a newline is still offered to the sink when it
/// already decodes, so the last event of a finished log is not lost, but it is
/// read again once its newline arrives and the store's natural key absorbs the
/// repeat. Lines that are not UTF-8 or not JSON objects are skipped but still
/// consumed. When the sink fails on a record the pass stops in front of that
/// line so a later pass retries it. On a read error the offset is advanced over
/// the lines already handled before the error is returned.
pub fn process_new_bytes(
    path: &Path,
    tracker: &OffsetTracker,
    sink: &dyn RecordSink,
) -> io::Result<FilePass> {
    let lock = tracker.file_lock(path);
    let _guard = lock.lock();

    let mut file = File::open(path)?;
    let metadata = file.metadata()?;
    let (start_offset, reset) =
        tracker.resume_offset(path, metadata.len(), inode_from_metadata(&metadata));
    if reset {
        tracing::debug!(path = %path.display(), "file truncated or replaced, rereading");
    }
    file.seek(SeekFrom::Start(start_offset))?;

    let mut pass = FilePass {
        start_offset,
        end_offset: start_offset,
        reset,
        ..FilePass::default()
    };
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let read = loop {
        buf.clear();
        let bytes = match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break Ok(()),
            Ok(bytes) => bytes,
            Err(err) => break Err(err),
        };
        let terminated = buf.last() == Some(&b'\n');

        let value = std::str::from_utf8(&buf).ok().and_then(parse_record_line);
        let Some(value) = value else {
            if !terminated {
                break Ok(());
            }
            pass.bytes_read += bytes as u64;
            pass.end_offset += bytes as u64;
            continue;
        };

        let accepted = sink.accept(&RawRecord { path, value });
        if accepted == SinkOutcome::Failed {
            tracing::debug!(
                path = %path.display(),
                offset = pass.end_offset,
                "sink failed, retrying line on next pass"
            );
            break Ok(());
        }
        pass.records += 1;
        if accepted.is_event() {
            pass.events_found += 1;
        }
        if accepted == SinkOutcome::Stored {
            pass.events_inserted += 1;
        }
        if !terminated {
            break Ok(());
        }
        pass.bytes_read += bytes as u64;
        pass.end_offset += bytes as u64;
    };

    tracker.advance(path, pass.end_offset);
    read.map(|()| pass)
}

fn inode_from_metadata(metadata: &fs::Metadata) -> Option<u64> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        Some(metadata.ino())
    }
    #[cfg(not(unix))]
    {
        let _ = metadata;
        None
    }
}
