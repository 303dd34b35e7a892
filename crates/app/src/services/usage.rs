use crate::error::Result;
use crate::services::{QuotaAlignment, SharedConfig, SharedQuota, open_db};
use tracker_core::UsageSnapshot;
use tracker_db::Db;

#[derive(Clone)]
pub struct UsageService {
    config: SharedConfig,
    quota: SharedQuota,
}

impl UsageService {
    pub(super) fn new(config: SharedConfig, quota: SharedQuota) -> Self {
        Self { config, quota }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Current five-hour and weekly totals. Windows start at the quota's
    /// reported window start when available, otherwise they roll back from now.
    pub fn snapshot(&self) -> Result<UsageSnapshot> {
        let alignment = QuotaAlignment::from_quota(self.quota.get().as_ref());
        let db = self.db()?;
        let (five_hour, weekly) = alignment.totals(&db)?;
        Ok(UsageSnapshot {
            five_hour,
            five_hour_limit: self.config.five_hour_limit_tokens,
            weekly,
            weekly_opus_hours: self.config.weekly_opus_hours,
            weekly_sonnet_hours: self.config.weekly_sonnet_hours,
            opus_tokens_per_hour: self.config.opus_tokens_per_hour,
            sonnet_tokens_per_hour: self.config.sonnet_tokens_per_hour,
        })
    }
}
