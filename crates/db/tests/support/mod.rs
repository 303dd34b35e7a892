#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;
use tracker_core::{TokenCounts, UsageEvent};
use tracker_db::Db;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn tokens(input: u64, output: u64, cache_creation: u64, cache_read: u64) -> TokenCounts {
    TokenCounts {
        input_tokens: input,
        output_tokens: output,
        cache_creation_tokens: cache_creation,
        cache_read_tokens: cache_read,
    }
}

pub fn make_event(ts: &str, session_id: &str, model: &str, tokens: TokenCounts) -> UsageEvent {
    UsageEvent {
        timestamp: ts.to_string(),
        session_id: session_id.to_string(),
        model: model.to_string(),
        tokens,
    }
}

pub fn insert_events(db: &Db, events: Vec<UsageEvent>) {
    for event in &events {
        db.insert_usage_event(event).expect("insert event");
    }
}
