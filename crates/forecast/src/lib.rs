//! Burn-rate, projection and quota-calibration math over usage history.
//!
//! Every function here is pure: callers pass in the points and the clock.

mod limits;
mod points;
mod projection;
mod regression;

pub use limits::{
    burn_rate, derived_limit, format_time_to_limit, time_to_limit, usage_trend, will_hit_limit,
};
pub use points::{UsagePoint, bucket_points, bucket_start, cumulative_points};
pub use projection::{SHORT_WINDOW_HOURS, forecast_short_window, forecast_weekly, forecast_window};
pub use regression::{Regression, linear_regression};
