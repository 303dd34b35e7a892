use rusqlite::Connection;

#[test]
fn migrate_is_repeatable_and_keeps_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("repeat.sqlite");

    let mut db = tracker_db::Db::open(&db_path).expect("open db");
    db.migrate().expect("first migrate");
    {
        let conn = Connection::open(&db_path).expect("open conn");
        conn.execute(
            r#"
            INSERT INTO usage_records (timestamp, session_id, model, input_tokens, output_tokens)
            VALUES ('2025-06-01T10:00:00.000Z', 'session-a', 'claude-sonnet-4', 10, 2)
            "#,
            [],
        )
        .expect("insert record");
    }
    db.migrate().expect("second migrate");

    assert_eq!(db.record_count().expect("count"), 1);
}

#[test]
fn schema_enforces_natural_key_and_indexes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("schema.sqlite");
    tracker_db::Db::open(&db_path)
        .expect("open db")
        .migrate()
        .expect("migrate");

    let conn = Connection::open(&db_path).expect("open conn");
    let insert = r#"
        INSERT INTO usage_records (timestamp, session_id, model)
        VALUES ('2025-06-01T10:00:00.000Z', 'session-a', 'm')
    "#;
    conn.execute(insert, []).expect("first insert");
    assert!(conn.execute(insert, []).is_err());

    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = 'usage_records'")
        .expect("prepare");
    let names: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("collect");
    for expected in [
        "idx_usage_records_timestamp",
        "idx_usage_records_session_id",
        "idx_usage_records_model",
    ] {
        assert!(names.iter().any(|name| name == expected), "missing {expected}");
    }
}
