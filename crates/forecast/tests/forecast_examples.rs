use chrono::{Duration, TimeZone, Utc};
use forecast::{
    UsagePoint, burn_rate, cumulative_points, derived_limit, forecast_short_window,
    forecast_weekly, linear_regression, time_to_limit,
};
use tracker_core::{Trend, UsageBucket, UsageTotals};

fn hour_bucket(hour: u32, total_tokens: u64) -> UsageBucket {
    UsageBucket {
        bucket_start: format!("2025-06-01T{hour:02}:00:00Z"),
        totals: UsageTotals {
            input_tokens: total_tokens,
            total_tokens,
            message_count: 1,
            ..UsageTotals::default()
        },
    }
}

#[test]
fn regression_on_a_straight_line() {
    let fit = linear_regression(&[(0.0, 0.0), (1.0, 10.0), (2.0, 20.0)]);
    assert!((fit.slope - 10.0).abs() < 1e-9);
    assert!(fit.intercept.abs() < 1e-9);
    assert!((fit.r_squared - 1.0).abs() < 1e-9);
}

#[test]
fn hourly_history_drives_burn_rate_and_time_to_limit() {
    let buckets = vec![
        hour_bucket(10, 2_000),
        hour_bucket(11, 2_000),
        hour_bucket(12, 2_000),
    ];
    let points = cumulative_points(&buckets);
    let rate = burn_rate(&points);
    assert!((rate - 2_000.0).abs() < 1e-6);

    let hours = time_to_limit(6_000, 10_000, rate).expect("growing usage");
    assert!((hours - 2.0).abs() < 1e-6);
}

#[test]
fn short_window_and_weekly_examples() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid date");
    let short = forecast_short_window(10_000, now - Duration::hours(2), now);
    assert_eq!(short.predicted_tokens, 25_000);
    assert!((short.confidence - 0.4).abs() < 1e-9);
    assert_eq!(short.trend, Trend::Increasing);

    let weekly = forecast_weekly(&[UsagePoint::new(now, 5_000)]);
    assert_eq!(weekly.predicted_tokens, 35_000);
    assert!((weekly.confidence - 0.1).abs() < 1e-9);
    assert_eq!(weekly.trend, Trend::Stable);
}

#[test]
fn calibration_derives_the_implied_limit() {
    assert_eq!(derived_limit(36_000, 36.0), Some(100_000));
}
