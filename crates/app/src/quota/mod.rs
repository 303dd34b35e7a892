mod cache;
mod oauth;

use tracker_core::QuotaUsage;

pub use cache::CachedQuota;
pub use oauth::{OAUTH_USAGE_URL, OAuthQuotaSource, read_access_token};

/// Source of the authoritative utilization percentages for the quota
/// windows. Implementations report any failure as `None`.
pub trait QuotaSource: Send + Sync {
    fn fetch(&self) -> Option<QuotaUsage>;
}

/// Source used when no remote quota is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQuota;

impl QuotaSource for NoQuota {
    fn fetch(&self) -> Option<QuotaUsage> {
        None
    }
}
