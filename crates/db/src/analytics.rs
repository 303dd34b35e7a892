use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rusqlite::params;
use tracker_core::{AggregateWindow, UsageBucket, UsageTotals};

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::{SUM_COLUMNS, format_timestamp, row_to_totals};
use crate::types::Bucket;

/// Start of a window: `since` when the caller knows the exact window start,
/// otherwise `now - hours`.
pub fn window_cutoff(
    since: Option<DateTime<Utc>>,
    hours: f64,
    now: DateTime<Utc>,
) -> Result<String> {
    if let Some(since) = since {
        return Ok(format_timestamp(since));
    }
    Ok(format_timestamp(now - hours_to_duration(hours)?))
}

fn hours_to_duration(hours: f64) -> Result<Duration> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(DbError::InvalidWindow(format!("hours must be >= 0, got {hours}")));
    }
    Ok(Duration::milliseconds((hours * 3_600_000.0).round() as i64))
}

impl Db {
    pub fn window_totals(
        &self,
        since: Option<DateTime<Utc>>,
        hours: f64,
    ) -> Result<AggregateWindow> {
        let cutoff = window_cutoff(since, hours, Utc::now())?;
        self.totals_since(&cutoff)
    }

    pub fn usage_in_days(&self, days: u32) -> Result<AggregateWindow> {
        self.window_totals(None, f64::from(days) * 24.0)
    }

    pub fn totals_since(&self, cutoff: &str) -> Result<AggregateWindow> {
        let totals = self.conn.query_row(
            &format!(
                "SELECT {SUM_COLUMNS} FROM usage_records WHERE timestamp >= ?1"
            ),
            params![cutoff],
            |row| row_to_totals(row, 0),
        )?;

        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT model, {SUM_COLUMNS}
            FROM usage_records
            WHERE timestamp >= ?1
            GROUP BY model
            ORDER BY model
            "#
        ))?;
        let rows = stmt.query_map(params![cutoff], |row| {
            Ok((row.get::<_, String>(0)?, row_to_totals(row, 1)?))
        })?;
        let by_model = rows.collect::<std::result::Result<BTreeMap<String, UsageTotals>, _>>()?;

        Ok(AggregateWindow { totals, by_model })
    }

    pub fn hourly_buckets(&self, hours: u32) -> Result<Vec<UsageBucket>> {
        let cutoff = window_cutoff(None, f64::from(hours), Utc::now())?;
        self.buckets_since(Bucket::Hour, &cutoff)
    }

    pub fn daily_buckets(&self, days: u32) -> Result<Vec<UsageBucket>> {
        let cutoff = window_cutoff(None, f64::from(days) * 24.0, Utc::now())?;
        self.buckets_since(Bucket::Day, &cutoff)
    }

    /// Ascending buckets with at least one event; empty buckets are omitted.
    pub fn buckets_since(&self, bucket: Bucket, cutoff: &str) -> Result<Vec<UsageBucket>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {label} AS bucket_start, {SUM_COLUMNS}
            FROM usage_records
            WHERE timestamp >= ?1
            GROUP BY bucket_start
            ORDER BY bucket_start
            "#,
            label = bucket.label_sql(),
        ))?;
        let rows = stmt.query_map(params![cutoff], |row| {
            Ok(UsageBucket {
                bucket_start: row.get(0)?,
                totals: row_to_totals(row, 1)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn window_cutoff_prefers_explicit_start() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let since = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        let cutoff = window_cutoff(Some(since), 5.0, now).expect("cutoff");
        assert_eq!(cutoff, "2025-06-01T09:30:00.000Z");
    }

    #[test]
    fn window_cutoff_falls_back_to_rolling_window() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let cutoff = window_cutoff(None, 5.0, now).expect("cutoff");
        assert_eq!(cutoff, "2025-06-01T07:00:00.000Z");
    }

    #[test]
    fn window_cutoff_rejects_negative_hours() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        assert!(window_cutoff(None, -1.0, now).is_err());
    }
}
