use chrono::{DateTime, Utc};
use tracker_core::{Forecast, Trend};

use crate::points::{UsagePoint, offsets, sorted};
use crate::regression::linear_regression;

/// Length of the short quota window in hours.
pub const SHORT_WINDOW_HOURS: f64 = 5.0;

const SECS_PER_HOUR: f64 = 3_600.0;
const SECS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_WEEK: usize = 7;
/// Daily points needed before history stops lowering confidence.
const FULL_HISTORY_DAYS: f64 = 14.0;

/// Extrapolates the usage seen since `window_start` to the end of a
/// [`SHORT_WINDOW_HOURS`] window at a constant average rate.
pub fn forecast_short_window(
    current_usage: u64,
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Forecast {
    forecast_window(current_usage, window_start, now, SHORT_WINDOW_HOURS)
}

/// Same as [`forecast_short_window`] with an explicit horizon.
///
/// Rates between 10 and 100 tokens per hour classify as increasing, the
/// same as rates above 100.
pub fn forecast_window(
    current_usage: u64,
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
    horizon_hours: f64,
) -> Forecast {
    let elapsed = (now - window_start).num_milliseconds() as f64 / 1000.0 / SECS_PER_HOUR;
    if elapsed <= 0.0 || horizon_hours <= 0.0 {
        return Forecast {
            predicted_tokens: current_usage,
            confidence: 0.0,
            trend: Trend::Stable,
        };
    }

    let rate = current_usage as f64 / elapsed;
    let remaining = (horizon_hours - elapsed).max(0.0);
    let predicted_tokens = current_usage.saturating_add((rate * remaining) as u64);
    let trend = if rate > 100.0 {
        Trend::Increasing
    } else if rate < 10.0 {
        Trend::Stable
    } else {
        Trend::Increasing
    };

    Forecast {
        predicted_tokens,
        confidence: (elapsed / horizon_hours).min(1.0),
        trend,
    }
}

/// Projects the next seven days from per-day usage points.
pub fn forecast_weekly(daily: &[UsagePoint]) -> Forecast {
    match daily {
        [] => Forecast {
            predicted_tokens: 0,
            confidence: 0.0,
            trend: Trend::Stable,
        },
        [only] => Forecast {
            predicted_tokens: only.tokens.saturating_mul(DAYS_PER_WEEK as u64),
            confidence: 0.1,
            trend: Trend::Stable,
        },
        _ => {
            let series = offsets(&sorted(daily), SECS_PER_DAY);
            let fit = linear_regression(&series);
            let last_day = series.last().map(|(x, _)| *x).unwrap_or(0.0);
            let predicted: f64 = (1..=DAYS_PER_WEEK)
                .map(|ahead| fit.predict(last_day + ahead as f64).max(0.0))
                .sum();

            let trend = if fit.slope > 50.0 {
                Trend::Increasing
            } else if fit.slope < -50.0 {
                Trend::Decreasing
            } else {
                Trend::Stable
            };
            let coverage = (daily.len() as f64 / FULL_HISTORY_DAYS).min(1.0);

            Forecast {
                predicted_tokens: predicted as u64,
                confidence: fit.r_squared * 0.7 + coverage * 0.3,
                trend,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).single().expect("valid date")
    }

    #[test]
    fn short_window_extrapolates_average_rate() {
        let now = at(1, 12);
        let forecast = forecast_short_window(10_000, now - Duration::hours(2), now);
        assert_eq!(forecast.predicted_tokens, 25_000);
        assert!((forecast.confidence - 0.4).abs() < 1e-9);
        assert_eq!(forecast.trend, Trend::Increasing);
    }

    #[test]
    fn short_window_without_elapsed_time_is_stable() {
        let now = at(1, 12);
        let forecast = forecast_short_window(1_234, now, now);
        assert_eq!(forecast.predicted_tokens, 1_234);
        assert_eq!(forecast.confidence, 0.0);
        assert_eq!(forecast.trend, Trend::Stable);

        let future_start = forecast_short_window(1_234, now + Duration::hours(1), now);
        assert_eq!(future_start.predicted_tokens, 1_234);
    }

    #[test]
    fn short_window_trend_bands() {
        let now = at(1, 12);
        let start = now - Duration::hours(1);
        assert_eq!(forecast_short_window(5, start, now).trend, Trend::Stable);
        assert_eq!(forecast_short_window(50, start, now).trend, Trend::Increasing);
        assert_eq!(forecast_short_window(500, start, now).trend, Trend::Increasing);
    }

    #[test]
    fn short_window_past_horizon_keeps_usage_and_full_confidence() {
        let now = at(1, 12);
        let forecast = forecast_short_window(9_000, now - Duration::hours(6), now);
        assert_eq!(forecast.predicted_tokens, 9_000);
        assert_eq!(forecast.confidence, 1.0);
    }

    #[test]
    fn weekly_with_one_point_assumes_constant_rate() {
        let forecast = forecast_weekly(&[UsagePoint::new(at(1, 0), 5_000)]);
        assert_eq!(forecast.predicted_tokens, 35_000);
        assert!((forecast.confidence - 0.1).abs() < 1e-9);
        assert_eq!(forecast.trend, Trend::Stable);
    }

    #[test]
    fn weekly_without_history_is_zero() {
        let forecast = forecast_weekly(&[]);
        assert_eq!(forecast.predicted_tokens, 0);
        assert_eq!(forecast.confidence, 0.0);
    }

    #[test]
    fn weekly_regression_extrapolates_growth() {
        let daily: Vec<UsagePoint> = (0..7u32)
            .map(|day| UsagePoint::new(at(1 + day, 0), 1_000 + 100 * day as u64))
            .collect();
        let forecast = forecast_weekly(&daily);
        // Days 7..=13 on the line 1000 + 100x.
        assert_eq!(forecast.predicted_tokens, 7 * 1_000 + 100 * (7 + 8 + 9 + 10 + 11 + 12 + 13));
        assert_eq!(forecast.trend, Trend::Increasing);
        assert!((forecast.confidence - (0.7 + 0.3 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn weekly_predictions_are_floored_at_zero() {
        let daily = vec![
            UsagePoint::new(at(1, 0), 3_000),
            UsagePoint::new(at(2, 0), 2_000),
            UsagePoint::new(at(3, 0), 1_000),
        ];
        let forecast = forecast_weekly(&daily);
        assert_eq!(forecast.predicted_tokens, 0);
        assert_eq!(forecast.trend, Trend::Decreasing);
    }
}
