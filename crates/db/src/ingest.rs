use rusqlite::params;
use tracker_core::UsageEvent;

use crate::Db;
use crate::error::Result;

const INSERT_USAGE_SQL: &str = r#"
    INSERT OR IGNORE INTO usage_records (
      timestamp, session_id, model, input_tokens, output_tokens,
      cache_creation_tokens, cache_read_tokens
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

impl Db {
    /// Returns `false` when the `(timestamp, session_id)` key already exists.
    pub fn insert_usage_event(&self, event: &UsageEvent) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(INSERT_USAGE_SQL)?;
        let rows = stmt.execute(params![
            event.timestamp,
            event.session_id,
            event.model,
            event.tokens.input_tokens as i64,
            event.tokens.output_tokens as i64,
            event.tokens.cache_creation_tokens as i64,
            event.tokens.cache_read_tokens as i64,
        ])?;
        Ok(rows > 0)
    }

    pub fn record_count(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM usage_records", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}
