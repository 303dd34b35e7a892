use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracker_core::UsageBucket;

/// Token count observed at an instant, cumulative or per bucket depending
/// on the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsagePoint {
    pub timestamp: DateTime<Utc>,
    pub tokens: u64,
}

impl UsagePoint {
    pub fn new(timestamp: DateTime<Utc>, tokens: u64) -> Self {
        Self { timestamp, tokens }
    }
}

/// Start instant of a bucket label (`YYYY-MM-DDTHH:00:00Z` or `YYYY-MM-DD`).
pub fn bucket_start(label: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(label) {
        return Some(parsed.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(label, "%Y-%m-%d").ok()?;
    Some(day.and_hms_opt(0, 0, 0)?.and_utc())
}

/// One point per bucket carrying that bucket's own total.
pub fn bucket_points(buckets: &[UsageBucket]) -> Vec<UsagePoint> {
    let mut points: Vec<UsagePoint> = buckets
        .iter()
        .filter_map(|bucket| {
            let timestamp = bucket_start(&bucket.bucket_start)?;
            Some(UsagePoint::new(timestamp, bucket.totals.total_tokens))
        })
        .collect();
    points.sort_by_key(|point| point.timestamp);
    points
}

/// Running total of bucket tokens in chronological order, the shape burn
/// rate regression expects.
pub fn cumulative_points(buckets: &[UsageBucket]) -> Vec<UsagePoint> {
    let mut running = 0u64;
    bucket_points(buckets)
        .into_iter()
        .map(|point| {
            running = running.saturating_add(point.tokens);
            UsagePoint::new(point.timestamp, running)
        })
        .collect()
}

/// Chronologically sorted copy.
pub(crate) fn sorted(points: &[UsagePoint]) -> Vec<UsagePoint> {
    let mut sorted = points.to_vec();
    sorted.sort_by_key(|point| point.timestamp);
    sorted
}

/// `(offset from first point in units of unit_secs, tokens)` pairs.
pub(crate) fn offsets(points: &[UsagePoint], unit_secs: f64) -> Vec<(f64, f64)> {
    let Some(base) = points.first().map(|point| point.timestamp) else {
        return Vec::new();
    };
    points
        .iter()
        .map(|point| {
            let elapsed = (point.timestamp - base).num_milliseconds() as f64 / 1000.0;
            (elapsed / unit_secs, point.tokens as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::UsageTotals;

    fn bucket(label: &str, total_tokens: u64) -> UsageBucket {
        UsageBucket {
            bucket_start: label.to_string(),
            totals: UsageTotals {
                output_tokens: total_tokens,
                total_tokens,
                message_count: 1,
                ..UsageTotals::default()
            },
        }
    }

    #[test]
    fn parses_hour_and_day_labels() {
        let hour = bucket_start("2025-06-01T10:00:00Z").expect("hour");
        assert_eq!(hour.to_rfc3339(), "2025-06-01T10:00:00+00:00");
        let day = bucket_start("2025-06-01").expect("day");
        assert_eq!(day.to_rfc3339(), "2025-06-01T00:00:00+00:00");
        assert!(bucket_start("June 1st").is_none());
    }

    #[test]
    fn cumulative_points_accumulate_in_time_order() {
        let buckets = vec![
            bucket("2025-06-01T11:00:00Z", 300),
            bucket("2025-06-01T10:00:00Z", 100),
            bucket("garbage", 999),
            bucket("2025-06-01T12:00:00Z", 50),
        ];
        let points = cumulative_points(&buckets);
        let tokens: Vec<u64> = points.iter().map(|point| point.tokens).collect();
        assert_eq!(tokens, vec![100, 400, 450]);
        assert!(points.windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp));
    }

    #[test]
    fn offsets_are_relative_to_first_point() {
        let base = bucket_start("2025-06-01T10:00:00Z").expect("base");
        let points = vec![
            UsagePoint::new(base, 10),
            UsagePoint::new(base + chrono::Duration::minutes(90), 40),
        ];
        assert_eq!(offsets(&points, 3600.0), vec![(0.0, 10.0), (1.5, 40.0)]);
    }
}
