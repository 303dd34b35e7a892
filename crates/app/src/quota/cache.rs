use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracker_core::QuotaUsage;

use super::QuotaSource;

struct CacheEntry {
    value: QuotaUsage,
    expires_at: Instant,
}

/// Memoizes the last successful quota fetch until an explicit expiry.
/// Failures are not cached, so the next call retries.
pub struct CachedQuota {
    source: Arc<dyn QuotaSource>,
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl CachedQuota {
    pub fn new(source: Arc<dyn QuotaSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn get(&self) -> Option<QuotaUsage> {
        self.get_at(Instant::now())
    }

    pub(crate) fn get_at(&self, now: Instant) -> Option<QuotaUsage> {
        let mut entry = self.entry.lock();
        if let Some(cached) = entry.as_ref() {
            if now < cached.expires_at {
                return Some(cached.value.clone());
            }
        }
        // Lock stays held across the fetch: one request in flight at a time.
        let value = self.source.fetch()?;
        *entry = Some(CacheEntry {
            value: value.clone(),
            expires_at: now + self.ttl,
        });
        Some(value)
    }

    pub fn invalidate(&self) {
        self.entry.lock().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracker_core::QuotaWindow;

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl QuotaSource for CountingSource {
        fn fetch(&self) -> Option<QuotaUsage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return None;
            }
            Some(QuotaUsage {
                five_hour: Some(QuotaWindow {
                    utilization: Some(36.0),
                    resets_at: Some("2025-06-01T15:00:00Z".to_string()),
                }),
                seven_day: None,
            })
        }
    }

    fn source(fail: bool) -> Arc<CountingSource> {
        Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    #[test]
    fn serves_cached_value_until_expiry() {
        let counting = source(false);
        let cache = CachedQuota::new(counting.clone(), Duration::from_secs(60));
        let start = Instant::now();

        assert!(cache.get_at(start).is_some());
        assert!(cache.get_at(start + Duration::from_secs(30)).is_some());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);

        assert!(cache.get_at(start + Duration::from_secs(61)).is_some());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let counting = source(true);
        let cache = CachedQuota::new(counting.clone(), Duration::from_secs(60));
        let start = Instant::now();
        assert!(cache.get_at(start).is_none());
        assert!(cache.get_at(start).is_none());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_forces_refetch() {
        let counting = source(false);
        let cache = CachedQuota::new(counting.clone(), Duration::from_secs(60));
        cache.get();
        cache.invalidate();
        cache.get();
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }
}
