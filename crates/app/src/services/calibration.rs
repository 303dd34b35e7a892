use chrono::{DateTime, Utc};
use tracker_core::{Calibration, CalibrationWindow, QuotaUsage, QuotaWindow};
use tracker_db::{Db, format_timestamp};

use crate::error::Result;
use crate::services::{QuotaAlignment, SharedConfig, SharedQuota, open_db};

#[derive(Clone)]
pub struct CalibrationService {
    config: SharedConfig,
    quota: SharedQuota,
}

impl CalibrationService {
    pub(super) fn new(config: SharedConfig, quota: SharedQuota) -> Self {
        Self { config, quota }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Compares local totals over the quota-aligned windows with the remote
    /// utilization percentages.
    pub fn calibration(&self) -> Result<Calibration> {
        let quota = self.quota.get();
        let alignment = QuotaAlignment::from_quota(quota.as_ref());
        let db = self.db()?;
        let (five_hour, weekly) = alignment.totals(&db)?;
        Ok(calibrate(
            quota.as_ref(),
            five_hour.totals.total_tokens,
            weekly.totals.total_tokens,
            Utc::now(),
        ))
    }
}

/// Derives implied limits from local totals and remote percentages. A
/// window without a positive percentage keeps only its local total.
pub(crate) fn calibrate(
    quota: Option<&QuotaUsage>,
    five_hour_tokens: u64,
    weekly_tokens: u64,
    now: DateTime<Utc>,
) -> Calibration {
    let window = |reported: Option<&QuotaWindow>, tokens: u64| {
        let mut calibrated = CalibrationWindow {
            calculated_tokens: tokens,
            ..CalibrationWindow::default()
        };
        let Some(reported) = reported else {
            return calibrated;
        };
        if let Some(percent) = reported.utilization.filter(|percent| *percent > 0.0) {
            calibrated.official_percent = Some(percent);
            calibrated.resets_at = reported.resets_at.clone();
            calibrated.derived_limit = ::forecast::derived_limit(tokens, percent);
        }
        calibrated
    };

    Calibration {
        oauth_available: quota.is_some(),
        five_hour: window(quota.and_then(|q| q.five_hour.as_ref()), five_hour_tokens),
        seven_day: window(quota.and_then(|q| q.seven_day.as_ref()), weekly_tokens),
        last_updated: format_timestamp(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).single().expect("valid date")
    }

    #[test]
    fn derives_limits_from_percentages() {
        let quota = QuotaUsage {
            five_hour: Some(QuotaWindow {
                utilization: Some(36.0),
                resets_at: Some("2025-06-01T15:00:00Z".to_string()),
            }),
            seven_day: Some(QuotaWindow {
                utilization: Some(0.0),
                resets_at: Some("2025-06-05T00:00:00Z".to_string()),
            }),
        };
        let calibration = calibrate(Some(&quota), 36_000, 500_000, now());
        assert!(calibration.oauth_available);
        assert_eq!(calibration.five_hour.official_percent, Some(36.0));
        assert_eq!(calibration.five_hour.derived_limit, Some(100_000));
        assert_eq!(calibration.five_hour.resets_at.as_deref(), Some("2025-06-01T15:00:00Z"));
        assert_eq!(calibration.seven_day.calculated_tokens, 500_000);
        assert_eq!(calibration.seven_day.official_percent, None);
        assert_eq!(calibration.seven_day.derived_limit, None);
        assert_eq!(calibration.last_updated, "2025-06-01T12:00:00.000Z");
    }

    #[test]
    fn missing_quota_keeps_local_totals_only() {
        let calibration = calibrate(None, 1_000, 2_000, now());
        assert!(!calibration.oauth_available);
        assert_eq!(calibration.five_hour.calculated_tokens, 1_000);
        assert_eq!(calibration.five_hour.derived_limit, None);
        assert_eq!(calibration.seven_day.calculated_tokens, 2_000);
    }
}
