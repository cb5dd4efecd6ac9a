//! Short-lived cache of the last fetched booked map.
//!
//! The cache only makes the first render fast; it is never authoritative. A
//! fresh fetch always replaces it, and a successful submission invalidates it.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use slot_engine::BookedMap;

const SNAPSHOT_KEY: &str = "bookedDates";

/// Holder of at most one booked-map snapshot.
pub trait SnapshotCache: Send + Sync {
    fn get(&self) -> Option<Arc<BookedMap>>;

    fn set(&self, snapshot: Arc<BookedMap>);

    fn invalidate(&self);
}

/// In-process [`SnapshotCache`] whose entry expires after a fixed time-to-live.
#[derive(Clone)]
pub struct MokaSnapshotCache {
    inner: Cache<&'static str, Arc<BookedMap>>,
}

impl MokaSnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }
}

impl SnapshotCache for MokaSnapshotCache {
    fn get(&self) -> Option<Arc<BookedMap>> {
        self.inner.get(SNAPSHOT_KEY)
    }

    fn set(&self, snapshot: Arc<BookedMap>) {
        self.inner.insert(SNAPSHOT_KEY, snapshot);
    }

    fn invalidate(&self) {
        self.inner.invalidate(SNAPSHOT_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot() -> Arc<BookedMap> {
        Arc::new(BookedMap::new().with_booking(NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(), "a"))
    }

    #[test]
    fn set_then_get_returns_same_snapshot() {
        let cache = MokaSnapshotCache::new(Duration::from_secs(60));
        assert!(cache.get().is_none());

        let map = snapshot();
        cache.set(Arc::clone(&map));
        assert!(Arc::ptr_eq(&cache.get().unwrap(), &map));
    }

    #[test]
    fn set_replaces_wholesale() {
        let cache = MokaSnapshotCache::new(Duration::from_secs(60));
        cache.set(snapshot());
        cache.set(Arc::new(BookedMap::new()));
        assert!(cache.get().unwrap().is_empty());
    }

    #[test]
    fn invalidate_clears_entry() {
        let cache = MokaSnapshotCache::new(Duration::from_secs(60));
        cache.set(snapshot());
        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
