use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use tracker_core::{TokenCounts, UsageTotals};

/// Canonical stored form of an instant: RFC 3339, UTC, millisecond precision.
/// Stored timestamps compare lexically in chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) const SUM_COLUMNS: &str = r#"
    COALESCE(SUM(input_tokens), 0),
    COALESCE(SUM(output_tokens), 0),
    COALESCE(SUM(cache_creation_tokens), 0),
    COALESCE(SUM(cache_read_tokens), 0),
    COUNT(*)
"#;

fn non_negative(value: i64) -> u64 {
    value.max(0) as u64
}

/// Reads the five `SUM_COLUMNS` values starting at column `start`.
pub(crate) fn row_to_totals(
    row: &Row<'_>,
    start: usize,
) -> std::result::Result<UsageTotals, rusqlite::Error> {
    let tokens = TokenCounts {
        input_tokens: non_negative(row.get(start)?),
        output_tokens: non_negative(row.get(start + 1)?),
        cache_creation_tokens: non_negative(row.get(start + 2)?),
        cache_read_tokens: non_negative(row.get(start + 3)?),
    };
    let message_count = non_negative(row.get(start + 4)?);
    Ok(UsageTotals::from_counts(tokens, message_count))
}
