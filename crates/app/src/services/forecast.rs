use chrono::{DateTime, Duration, Utc};
use ::forecast::{
    bucket_points, burn_rate, cumulative_points, forecast_short_window, forecast_weekly,
    format_time_to_limit, time_to_limit, usage_trend, will_hit_limit,
};
use tracker_core::{
    FiveHourForecast, ForecastReport, QuotaUsage, RateForecast, UsageBucket, WeeklyForecast,
};
use tracker_db::{Db, format_timestamp};

use crate::error::Result;
use crate::services::calibration::calibrate;
use crate::services::{FIVE_HOURS, QuotaAlignment, SharedConfig, SharedQuota, open_db};
use crate::util::time::{hours_until, round_tenths};

const BURN_RATE_HOURS: u32 = 6;
const HISTORICAL_DAYS: u32 = 7;
const DEFAULT_HOURS_UNTIL_RESET: f64 = 5.0;
const DEFAULT_DAYS_UNTIL_RESET: f64 = 7.0;

#[derive(Clone)]
pub struct ForecastService {
    config: SharedConfig,
    quota: SharedQuota,
}

impl ForecastService {
    pub(super) fn new(config: SharedConfig, quota: SharedQuota) -> Self {
        Self { config, quota }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn report(&self) -> Result<ForecastReport> {
        let quota = self.quota.get();
        let now = Utc::now();
        let db = self.db()?;
        let inputs = ForecastInputs::load(&db, quota.as_ref(), now)?;
        Ok(build_report(
            &inputs,
            self.config.five_hour_limit_tokens,
            quota.as_ref(),
            now,
        ))
    }
}

/// Store reads a forecast report is computed from.
#[derive(Debug, Clone)]
pub(crate) struct ForecastInputs {
    /// Hourly buckets of the recent burn-rate lookback.
    pub hourly: Vec<UsageBucket>,
    /// Daily buckets of the historical lookback.
    pub daily: Vec<UsageBucket>,
    /// Rolling five-hour total.
    pub five_hour_total: u64,
    /// Rolling seven-day total.
    pub weekly_total: u64,
    /// Start and total of the current five-hour window used for projection.
    pub window_start: DateTime<Utc>,
    pub window_total: u64,
}

impl ForecastInputs {
    fn load(db: &Db, quota: Option<&QuotaUsage>, now: DateTime<Utc>) -> Result<Self> {
        let five_hour_total = db.window_totals(None, FIVE_HOURS)?.totals.total_tokens;
        let (window_start, window_total) = match QuotaAlignment::from_quota(quota).five_hour {
            Some(start) => (
                start,
                db.totals_since(&format_timestamp(start))?.totals.total_tokens,
            ),
            None => (now - Duration::hours(5), five_hour_total),
        };
        Ok(Self {
            hourly: db.hourly_buckets(BURN_RATE_HOURS)?,
            daily: db.daily_buckets(HISTORICAL_DAYS)?,
            five_hour_total,
            weekly_total: db.usage_in_days(HISTORICAL_DAYS)?.totals.total_tokens,
            window_start,
            window_total,
        })
    }
}

pub(crate) fn build_report(
    inputs: &ForecastInputs,
    configured_limit: Option<u64>,
    quota: Option<&QuotaUsage>,
    now: DateTime<Utc>,
) -> ForecastReport {
    let cumulative = cumulative_points(&inputs.hourly);
    let session_hourly = burn_rate(&cumulative);
    let historical_daily = historical_daily_rate(&inputs.daily);
    let historical_hourly = historical_daily / 24.0;
    let session_daily = session_hourly * 24.0;

    let calibration = calibrate(quota, inputs.five_hour_total, inputs.weekly_total, now);
    let five_hour_limit = calibration
        .five_hour
        .derived_limit
        .filter(|limit| *limit > 0)
        .or(configured_limit);
    let weekly_limit = calibration.seven_day.derived_limit.filter(|limit| *limit > 0);

    let hours_until_reset = hours_until(calibration.five_hour.resets_at.as_deref(), now)
        .unwrap_or(DEFAULT_HOURS_UNTIL_RESET);
    let days_until_reset = hours_until(calibration.seven_day.resets_at.as_deref(), now)
        .map(|hours| hours / 24.0)
        .unwrap_or(DEFAULT_DAYS_UNTIL_RESET);

    let current = inputs.five_hour_total;
    let reset_in = Duration::milliseconds((hours_until_reset * 3_600_000.0) as i64);
    let five_hour = FiveHourForecast {
        session: five_hour_rate(session_hourly, current, five_hour_limit, hours_until_reset),
        historical: five_hour_rate(historical_hourly, current, five_hour_limit, hours_until_reset),
        hours_until_reset: round_tenths(hours_until_reset),
        limit: five_hour_limit,
        will_exceed: five_hour_limit
            .is_some_and(|limit| will_hit_limit(current, limit, reset_in, &cumulative)),
        projection: forecast_short_window(inputs.window_total, inputs.window_start, now),
    };

    let weekly_current = inputs.weekly_total;
    let weekly = WeeklyForecast {
        session: weekly_rate(session_daily, weekly_current, weekly_limit, days_until_reset),
        historical: weekly_rate(historical_daily, weekly_current, weekly_limit, days_until_reset),
        days_until_reset: round_tenths(days_until_reset),
        limit: weekly_limit,
        projection: forecast_weekly(&bucket_points(&inputs.daily)),
    };

    ForecastReport {
        five_hour,
        weekly,
        trend: usage_trend(&bucket_points(&inputs.hourly), BURN_RATE_HOURS as f64, now),
        hourly_rate: session_hourly as u64,
        daily_projection: session_daily as u64,
        weekly_projection: (session_daily * 7.0) as u64,
        burn_rate_per_min: (session_hourly / 60.0) as u64,
    }
}

/// Mean daily total over days that saw any usage.
fn historical_daily_rate(daily: &[UsageBucket]) -> f64 {
    let active: Vec<u64> = daily
        .iter()
        .map(|bucket| bucket.totals.total_tokens)
        .filter(|tokens| *tokens > 0)
        .collect();
    if active.is_empty() {
        return 0.0;
    }
    active.iter().map(|tokens| *tokens as f64).sum::<f64>() / active.len() as f64
}

fn five_hour_rate(
    per_hour: f64,
    current: u64,
    limit: Option<u64>,
    hours_until_reset: f64,
) -> RateForecast {
    let hours = remaining_limit(current, limit)
        .and_then(|limit| time_to_limit(current, limit, per_hour));
    RateForecast {
        burn_rate: (per_hour / 60.0) as u64,
        burn_rate_unit: "tok/min".to_string(),
        forecast: hours.map(format_time_to_limit),
        critical: hours.is_some_and(|hours| hours < hours_until_reset),
    }
}

fn weekly_rate(
    per_day: f64,
    current: u64,
    limit: Option<u64>,
    days_until_reset: f64,
) -> RateForecast {
    let days = remaining_limit(current, limit)
        .and_then(|limit| time_to_limit(current, limit, per_day));
    RateForecast {
        burn_rate: (per_day / 1_000_000.0) as u64,
        burn_rate_unit: "M/day".to_string(),
        forecast: days.map(|days| format_time_to_limit(days * 24.0)),
        critical: days.is_some_and(|days| days < days_until_reset),
    }
}

/// The limit, only while usage is still below it.
fn remaining_limit(current: u64, limit: Option<u64>) -> Option<u64> {
    limit.filter(|limit| current < *limit)
}
