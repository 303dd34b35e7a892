mod calibration;
mod forecast;
mod history;
mod ingest;
mod usage;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracker_core::{AggregateWindow, QuotaUsage};
use tracker_db::Db;

use crate::config::AppConfig;
use crate::error::Result;
use crate::quota::CachedQuota;
use crate::util::time::window_start;

pub use calibration::CalibrationService;
pub use forecast::ForecastService;
pub use history::HistoryService;
pub use ingest::IngestService;
pub use usage::UsageService;

type SharedConfig = Arc<AppConfig>;
type SharedQuota = Arc<CachedQuota>;

const FIVE_HOURS: f64 = 5.0;
const WEEK_HOURS: f64 = 7.0 * 24.0;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub usage: UsageService,
    pub history: HistoryService,
    pub forecast: ForecastService,
    pub calibration: CalibrationService,
    pub ingest: IngestService,
}

impl AppServices {
    pub fn new(config: &AppConfig, quota: SharedQuota) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            usage: UsageService::new(shared.clone(), quota.clone()),
            history: HistoryService::new(shared.clone()),
            forecast: ForecastService::new(shared.clone(), quota.clone()),
            calibration: CalibrationService::new(shared.clone(), quota.clone()),
            ingest: IngestService::new(shared, quota),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}

/// Window starts taken from the quota's reset instants, when known.
#[derive(Debug, Clone, Copy, Default)]
struct QuotaAlignment {
    five_hour: Option<DateTime<Utc>>,
    weekly: Option<DateTime<Utc>>,
}

impl QuotaAlignment {
    fn from_quota(quota: Option<&QuotaUsage>) -> Self {
        let Some(quota) = quota else {
            return Self::default();
        };
        Self {
            five_hour: window_start(quota.five_hour.as_ref(), Duration::hours(5)),
            weekly: window_start(quota.seven_day.as_ref(), Duration::days(7)),
        }
    }

    /// Five-hour and weekly totals, falling back to rolling windows.
    fn totals(&self, db: &Db) -> Result<(AggregateWindow, AggregateWindow)> {
        let five_hour = db.window_totals(self.five_hour, FIVE_HOURS)?;
        let weekly = db.window_totals(self.weekly, WEEK_HOURS)?;
        Ok((five_hour, weekly))
    }
}
