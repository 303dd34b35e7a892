use crate::error::Result;
use crate::services::{SharedConfig, open_db};
use tracker_core::UsageHistory;
use tracker_db::Db;

const HISTORY_HOURS: u32 = 48;
const HISTORY_DAYS: u32 = 14;

#[derive(Clone)]
pub struct HistoryService {
    config: SharedConfig,
}

impl HistoryService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Hourly buckets for the last two days and daily buckets for the last
    /// two weeks, both oldest first. Empty buckets are omitted.
    pub fn history(&self) -> Result<UsageHistory> {
        let db = self.db()?;
        Ok(UsageHistory {
            hourly: db.hourly_buckets(HISTORY_HOURS)?,
            daily: db.daily_buckets(HISTORY_DAYS)?,
        })
    }
}
