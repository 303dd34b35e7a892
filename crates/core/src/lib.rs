use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Per-category token counts of a single invocation or an aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
}

impl TokenCounts {
    pub fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_creation_tokens)
            .saturating_add(self.cache_read_tokens)
    }

    pub fn saturating_add(self, other: TokenCounts) -> TokenCounts {
        TokenCounts {
            input_tokens: self.input_tokens.saturating_add(other.input_tokens),
            output_tokens: self.output_tokens.saturating_add(other.output_tokens),
            cache_creation_tokens: self
                .cache_creation_tokens
                .saturating_add(other.cache_creation_tokens),
            cache_read_tokens: self.cache_read_tokens.saturating_add(other.cache_read_tokens),
        }
    }
}

/// One model invocation's token accounting, keyed by `(timestamp, session_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub timestamp: String,
    pub session_id: String,
    pub model: String,
    #[serde(flatten)]
    pub tokens: TokenCounts,
}

/// Summed token categories plus message count. `total_tokens` is always
/// derived from the four categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    pub total_tokens: u64,
    pub message_count: u64,
}

impl UsageTotals {
    pub fn from_counts(tokens: TokenCounts, message_count: u64) -> Self {
        Self {
            input_tokens: tokens.input_tokens,
            output_tokens: tokens.output_tokens,
            cache_creation_tokens: tokens.cache_creation_tokens,
            cache_read_tokens: tokens.cache_read_tokens,
            total_tokens: tokens.total(),
            message_count,
        }
    }

    pub fn counts(&self) -> TokenCounts {
        TokenCounts {
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            cache_creation_tokens: self.cache_creation_tokens,
            cache_read_tokens: self.cache_read_tokens,
        }
    }
}

/// Totals over a time window, overall and grouped by model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateWindow {
    #[serde(flatten)]
    pub totals: UsageTotals,
    pub by_model: BTreeMap<String, UsageTotals>,
}

/// Totals for one hour or one day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageBucket {
    pub bucket_start: String,
    #[serde(flatten)]
    pub totals: UsageTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub predicted_tokens: u64,
    /// 0.0 to 1.0.
    pub confidence: f64,
    pub trend: Trend,
}

/// One window of the remote quota response. Every field is optional so
/// schema drift upstream degrades to "unknown" instead of a decode error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaWindow {
    #[serde(default)]
    pub utilization: Option<f64>,
    #[serde(default)]
    pub resets_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaUsage {
    #[serde(default)]
    pub five_hour: Option<QuotaWindow>,
    #[serde(default)]
    pub seven_day: Option<QuotaWindow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationWindow {
    pub official_percent: Option<f64>,
    pub resets_at: Option<String>,
    pub calculated_tokens: u64,
    pub derived_limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub oauth_available: bool,
    pub five_hour: CalibrationWindow,
    pub seven_day: CalibrationWindow,
    pub last_updated: String,
}

/// Token totals for the short and weekly windows plus the configured limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub five_hour: AggregateWindow,
    pub five_hour_limit: Option<u64>,
    pub weekly: AggregateWindow,
    pub weekly_opus_hours: u64,
    pub weekly_sonnet_hours: u64,
    pub opus_tokens_per_hour: u64,
    pub sonnet_tokens_per_hour: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageHistory {
    pub hourly: Vec<UsageBucket>,
    pub daily: Vec<UsageBucket>,
}

/// Time-to-limit estimate at one burn rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateForecast {
    pub burn_rate: u64,
    pub burn_rate_unit: String,
    /// Formatted time until the limit, absent when it is not approached.
    pub forecast: Option<String>,
    /// The limit would be reached before the window resets.
    pub critical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiveHourForecast {
    pub session: RateForecast,
    pub historical: RateForecast,
    pub hours_until_reset: f64,
    pub limit: Option<u64>,
    pub will_exceed: bool,
    pub projection: Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyForecast {
    pub session: RateForecast,
    pub historical: RateForecast,
    pub days_until_reset: f64,
    pub limit: Option<u64>,
    pub projection: Forecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub five_hour: FiveHourForecast,
    pub weekly: WeeklyForecast,
    pub trend: Trend,
    pub hourly_rate: u64,
    pub daily_projection: u64,
    pub weekly_projection: u64,
    pub burn_rate_per_min: u64,
}

/// Progress of the startup import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStatus {
    pub running: bool,
    pub completed: bool,
    pub new_records: usize,
    pub total_processed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResult {
    pub new_records: usize,
    pub total_processed: usize,
    pub total_in_db: u64,
    pub watcher_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub watcher_active: bool,
    pub db_path: String,
    pub claude_data_path: String,
    pub total_records: u64,
    pub import_status: ImportStatus,
}

/// Session id of a log file: its base name without extension.
pub fn session_id_from_path(path: &Path) -> String {
    match path.file_stem().and_then(|stem| stem.to_str()) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => path.to_string_lossy().to_string(),
    }
}
