use chrono::{DateTime, Duration, Utc};
use tracker_core::QuotaWindow;

/// Parses a reset instant reported by the quota endpoint.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Start of a quota window: its reset instant minus the window length.
pub fn window_start(window: Option<&QuotaWindow>, length: Duration) -> Option<DateTime<Utc>> {
    let resets_at = window?.resets_at.as_deref()?;
    Some(parse_instant(resets_at)? - length)
}

/// Hours from `now` until `resets_at`, negative once it has passed.
pub fn hours_until(resets_at: Option<&str>, now: DateTime<Utc>) -> Option<f64> {
    let reset = parse_instant(resets_at?)?;
    Some((reset - now).num_milliseconds() as f64 / 3_600_000.0)
}

/// Rounds to one decimal place.
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
