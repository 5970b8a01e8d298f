//! Operation counters for the cache store.
//!
//! Enabled with the `metrics` feature. The recorder is a set of plain
//! `u64` counters bumped inline by the store under its lock; reading is
//! done through a [`StoreMetricsSnapshot`], a `Copy` struct taken at a
//! single point in time.

/// Internal recorder owned by the store core.
#[derive(Debug, Default, Clone)]
pub(crate) struct StoreMetrics {
    get_hits: u64,
    get_misses: u64,
    put_new: u64,
    put_updates: u64,
    evictions: u64,
    remove_found: u64,
    remove_missed: u64,
}

impl StoreMetrics {
    #[inline]
    pub(crate) fn record_get_hit(&mut self) {
        self.get_hits += 1;
    }

    #[inline]
    pub(crate) fn record_get_miss(&mut self) {
        self.get_misses += 1;
    }

    #[inline]
    pub(crate) fn record_put_new(&mut self) {
        self.put_new += 1;
    }

    #[inline]
    pub(crate) fn record_put_update(&mut self) {
        self.put_updates += 1;
    }

    #[inline]
    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    #[inline]
    pub(crate) fn record_remove(&mut self, found: bool) {
        if found {
            self.remove_found += 1;
        } else {
            self.remove_missed += 1;
        }
    }

    pub(crate) fn snapshot(&self, len: usize) -> StoreMetricsSnapshot {
        StoreMetricsSnapshot {
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            put_new: self.put_new,
            put_updates: self.put_updates,
            evictions: self.evictions,
            remove_found: self.remove_found,
            remove_missed: self.remove_missed,
            len,
        }
    }
}

/// Point-in-time view of the store's operation counters.
///
/// # Example
///
/// ```
/// use waycache::store::SetAssocCore;
///
/// let mut cache: SetAssocCore<u64, &str> = SetAssocCore::try_new(4).unwrap();
/// cache.put(1, "one");
/// cache.get(&1);
/// cache.get(&2);
///
/// let snap = cache.metrics_snapshot();
/// assert_eq!(snap.put_new, 1);
/// assert_eq!(snap.get_hits, 1);
/// assert_eq!(snap.get_misses, 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreMetricsSnapshot {
    /// Lookups that found their key.
    pub get_hits: u64,
    /// Lookups that missed.
    pub get_misses: u64,
    /// Puts that inserted a previously-absent key.
    pub put_new: u64,
    /// Puts that overwrote an existing key in place.
    pub put_updates: u64,
    /// Entries displaced by the replacement policy.
    pub evictions: u64,
    /// Removes that found and dropped their key.
    pub remove_found: u64,
    /// Removes of absent keys.
    pub remove_missed: u64,
    /// Entry count at snapshot time.
    pub len: usize,
}

impl StoreMetricsSnapshot {
    /// Hit fraction over all lookups, or `None` before the first lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.get_hits + self.get_misses;
        if total == 0 {
            None
        } else {
            Some(self.get_hits as f64 / total as f64)
        }
    }
}
