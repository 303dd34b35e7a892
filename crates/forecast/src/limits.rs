use chrono::{DateTime, Duration, Utc};
use tracker_core::Trend;

use crate::points::{UsagePoint, offsets, sorted};
use crate::regression::linear_regression;

const SECS_PER_HOUR: f64 = 3_600.0;

/// Tokens per hour from a regression over cumulative points. Never negative;
/// fewer than two points give 0.
pub fn burn_rate(points: &[UsagePoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let fit = linear_regression(&offsets(&sorted(points), SECS_PER_HOUR));
    fit.slope.max(0.0)
}

/// Whether usage reaches `limit` before `time_remaining` runs out, at the
/// burn rate of `recent`.
pub fn will_hit_limit(
    current_usage: u64,
    limit: u64,
    time_remaining: Duration,
    recent: &[UsagePoint],
) -> bool {
    if current_usage >= limit {
        return true;
    }
    if time_remaining <= Duration::zero() || recent.len() < 2 {
        return false;
    }
    let rate = burn_rate(recent);
    if rate <= 0.0 {
        return false;
    }
    let hours = time_remaining.num_milliseconds() as f64 / 1000.0 / SECS_PER_HOUR;
    current_usage as f64 + rate * hours >= limit as f64
}

/// Hours until `limit` at `burn_rate` tokens per hour. `Some(0.0)` when the
/// limit is already reached; `None` when usage is not growing.
pub fn time_to_limit(current_usage: u64, limit: u64, burn_rate: f64) -> Option<f64> {
    if current_usage >= limit {
        return Some(0.0);
    }
    if burn_rate <= 0.0 || !burn_rate.is_finite() {
        return None;
    }
    Some((limit - current_usage) as f64 / burn_rate)
}

/// Direction of usage over the last `window_hours`, from the first and last
/// points inside it.
pub fn usage_trend(points: &[UsagePoint], window_hours: f64, now: DateTime<Utc>) -> Trend {
    let cutoff = now - Duration::milliseconds((window_hours * SECS_PER_HOUR * 1000.0) as i64);
    let recent: Vec<UsagePoint> = sorted(points)
        .into_iter()
        .filter(|point| point.timestamp >= cutoff)
        .collect();
    let (Some(first), Some(last)) = (recent.first(), recent.last()) else {
        return Trend::Stable;
    };
    let hours = (last.timestamp - first.timestamp).num_milliseconds() as f64 / 1000.0 / SECS_PER_HOUR;
    if recent.len() < 2 || hours <= 0.0 {
        return Trend::Stable;
    }
    let rate = (last.tokens as f64 - first.tokens as f64) / hours;
    if rate > 100.0 {
        Trend::Increasing
    } else if rate < -100.0 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Token limit implied by `tokens` being `percent` percent of the quota.
pub fn derived_limit(tokens: u64, percent: f64) -> Option<u64> {
    if !percent.is_finite() || percent <= 0.0 {
        return None;
    }
    Some((tokens as f64 * 100.0 / percent) as u64)
}

/// Compact duration label: whole minutes under an hour, tenths of hours
/// under a day, tenths of days beyond.
pub fn format_time_to_limit(hours: f64) -> String {
    if hours < 1.0 {
        format!("{}m", (hours * 60.0) as i64)
    } else if hours < 24.0 {
        format!("{hours:.1}h")
    } else {
        format!("{:.1}d", hours / 24.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).single().expect("valid date")
    }

    fn series(values: &[u64]) -> Vec<UsagePoint> {
        values
            .iter()
            .enumerate()
            .map(|(hour, tokens)| UsagePoint::new(base() + Duration::hours(hour as i64), *tokens))
            .collect()
    }

    #[test]
    fn burn_rate_is_slope_per_hour() {
        let rate = burn_rate(&series(&[1_000, 2_000, 3_000]));
        assert!((rate - 1_000.0).abs() < 1e-6);
    }

    #[test]
    fn burn_rate_floors_negative_slopes() {
        assert_eq!(burn_rate(&series(&[3_000, 2_000, 1_000])), 0.0);
        assert_eq!(burn_rate(&series(&[3_000])), 0.0);
    }

    #[test]
    fn limit_prediction() {
        let points = series(&[0, 10_000, 20_000]);
        assert!(will_hit_limit(100, 100, Duration::zero(), &[]));
        assert!(!will_hit_limit(10, 100, Duration::zero(), &points));
        assert!(!will_hit_limit(10, 100, Duration::hours(1), &points[..1]));
        assert!(will_hit_limit(80_000, 100_000, Duration::hours(3), &points));
        assert!(!will_hit_limit(80_000, 100_000, Duration::hours(1), &points));
    }

    #[test]
    fn time_to_limit_cases() {
        assert_eq!(time_to_limit(120, 100, 50.0), Some(0.0));
        assert_eq!(time_to_limit(0, 100, 0.0), None);
        assert_eq!(time_to_limit(0, 100, -5.0), None);
        assert_eq!(time_to_limit(50, 100, 25.0), Some(2.0));
    }

    #[test]
    fn usage_trend_uses_points_inside_the_window() {
        let points = series(&[0, 50, 10_000, 10_050]);
        let now = base() + Duration::hours(3);
        assert_eq!(usage_trend(&points, 1.0, now), Trend::Stable);
        assert_eq!(usage_trend(&points, 3.0, now), Trend::Increasing);

        let falling = series(&[5_000, 1_000]);
        assert_eq!(usage_trend(&falling, 2.0, base() + Duration::hours(1)), Trend::Decreasing);
        assert_eq!(usage_trend(&falling[..1], 2.0, base()), Trend::Stable);
    }

    #[test]
    fn derived_limit_scales_by_percent() {
        assert_eq!(derived_limit(36_000, 36.0), Some(100_000));
        assert_eq!(derived_limit(36_000, 0.0), None);
        assert_eq!(derived_limit(36_000, f64::NAN), None);
    }

    #[test]
    fn formats_time_to_limit() {
        assert_eq!(format_time_to_limit(0.5), "30m");
        assert_eq!(format_time_to_limit(2.5), "2.5h");
        assert_eq!(format_time_to_limit(3.0), "3.0h");
        assert_eq!(format_time_to_limit(36.0), "1.5d");
    }
}
