//! # N-way set-associative cache store
//!
//! The store partitions its key space into `ways` fixed-capacity sets,
//! the way a hardware set-associative CPU cache partitions memory lines.
//! Each key routes to exactly one set via its stable FNV-1a hash reduced
//! modulo the way count; the per-set recency list plus a global key
//! index make every operation O(1).
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────────┐
//!   │                     SetAssociativeCache<K, V>                     │
//!   │                                                                   │
//!   │   ┌───────────────────────────────────────────────────────────┐   │
//!   │   │            Arc<Mutex<SetAssocCore<K, Arc<V>>>>            │   │
//!   │   └───────────────────────────────────────────────────────────┘   │
//!   │                               │                                   │
//!   │                               ▼                                   │
//!   │   ┌───────────────────────────────────────────────────────────┐   │
//!   │   │                     SetAssocCore<K, V>                    │   │
//!   │   │                                                           │   │
//!   │   │   index: FxHashMap<K, Location { set, id }>               │   │
//!   │   │   ┌─────────┬───────────────┐                             │   │
//!   │   │   │   Key   │   Location    │   O(1) membership, no       │   │
//!   │   │   ├─────────┼───────────────┤   linear scan on get or     │   │
//!   │   │   │  k_1    │ (set 0, id 2) │   remove                    │   │
//!   │   │   │  k_2    │ (set 3, id 0) │                             │   │
//!   │   │   └─────────┴───────────────┘                             │   │
//!   │   │                                                           │   │
//!   │   │   sets: FxHashMap<usize, RecencyList<Entry<K, V>>>        │   │
//!   │   │   (created lazily on first insert into a set)             │   │
//!   │   │                                                           │   │
//!   │   │   set 0:  head ─► [k_1] ◄──► [k_7] ◄── tail               │   │
//!   │   │   set 3:  head ─► [k_2] ◄── tail                          │   │
//!   │   │           (most recent)      (least recent)               │   │
//!   │   └───────────────────────────────────────────────────────────┘   │
//!   └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operation flow
//!
//! ```text
//!   put(k, v), k absent, routed set full
//!   ═══════════════════════════════════════════════════════════════════
//!     1. idx = route_hash(k) mod ways
//!     2. victim = policy.victim(set[idx])     (pre-insertion state!)
//!     3. remove victim from set[idx] AND from index
//!     4. push (k, v) at head of set[idx]; record location in index
//!
//!   put(k, v), k present
//!   ═══════════════════════════════════════════════════════════════════
//!     1. look up location in index
//!     2. move entry to head, overwrite value; no eviction
//!
//!   get(k)
//!   ═══════════════════════════════════════════════════════════════════
//!     hit: move entry to head (a lookup is a touch under either
//!     policy), return value. miss: None.
//! ```
//!
//! ## Invariants
//!
//! - A key is in the index iff it is in exactly one set, and that set is
//!   the one its hash routes to.
//! - No set ever holds more than `ways` entries.
//! - Within a set, entries are totally ordered by recency with the most
//!   recently touched at the head.
//!
//! [`SetAssocCore::check_invariants`] verifies all three.
//!
//! ## Concurrency model
//!
//! One `parking_lot::Mutex` guards the whole core for the full duration
//! of every public operation of [`SetAssociativeCache`]. Coarse, but the
//! set mutation and the index mutation can never be observed out of
//! sync, and every operation is linearizable. Values are handed out as
//! `Arc<V>` so a snapshot or a hit never clones user data. A sharded
//! redesign would have to keep evict-then-insert atomic per set.
//!
//! | Method      | Complexity | Notes                                   |
//! |-------------|------------|-----------------------------------------|
//! | `put`       | O(1)       | May evict per policy first              |
//! | `get`       | O(1)       | Hit refreshes recency                   |
//! | `remove`    | O(1)       | Absent key is a normal outcome          |
//! | `entries`   | O(n)       | One consistent point in time            |
//! | `clear`     | O(n)       | Drops all sets and the index            |

use std::collections::HashMap;
use std::fmt;

use rustc_hash::FxHashMap;

use crate::ds::{EntryId, RecencyList};
use crate::error::{ConfigError, InvariantError};
use crate::key::CacheKey;
#[cfg(feature = "metrics")]
use crate::metrics::{StoreMetrics, StoreMetricsSnapshot};
use crate::policy::ReplacementPolicy;
use crate::traits::{CoreCache, MutableCache, SnapshotCache};

/// Owned key/value pair stored in a set's recency list.
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Where a key's entry lives: which set, and which slot within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Location {
    set: usize,
    id: EntryId,
}

/// Single-threaded set-associative cache engine.
///
/// `ways` is both the number of sets and the per-set capacity (the
/// "n-way" factor), so the store holds at most `ways * ways` entries.
/// The engine does no locking of its own; wrap it in
/// [`SetAssociativeCache`] for shared access.
///
/// # Example
///
/// ```
/// use waycache::policy::ReplacementPolicy;
/// use waycache::store::SetAssocCore;
///
/// let mut cache = SetAssocCore::try_new(4).unwrap();
///
/// cache.put(1u64, "one");
/// assert_eq!(cache.get(&1), Some(&"one"));
/// assert_eq!(cache.get(&2), None);
///
/// // MRU store
/// let mru = SetAssocCore::<u64, i32>::try_with_policy(4, ReplacementPolicy::Mru);
/// assert!(mru.is_ok());
/// ```
pub struct SetAssocCore<K, V>
where
    K: CacheKey,
{
    ways: usize,
    sets: FxHashMap<usize, RecencyList<Entry<K, V>>>,
    index: FxHashMap<K, Location>,
    policy: ReplacementPolicy,
    #[cfg(feature = "metrics")]
    metrics: StoreMetrics,
}

impl<K, V> SetAssocCore<K, V>
where
    K: CacheKey,
{
    /// Creates a store with the given way count and LRU replacement.
    ///
    /// Fails if `ways` is zero: the set-index modulus must be strictly
    /// positive.
    ///
    /// # Example
    ///
    /// ```
    /// use waycache::store::SetAssocCore;
    ///
    /// let cache = SetAssocCore::<u64, String>::try_new(8).unwrap();
    /// assert_eq!(cache.ways(), 8);
    /// assert!(cache.is_empty());
    /// ```
    pub fn try_new(ways: usize) -> Result<Self, ConfigError> {
        Self::try_with_policy(ways, ReplacementPolicy::default())
    }

    /// Creates a store with an explicit replacement policy.
    ///
    /// The policy is fixed for the lifetime of the instance.
    pub fn try_with_policy(ways: usize, policy: ReplacementPolicy) -> Result<Self, ConfigError> {
        if ways == 0 {
            return Err(ConfigError::new(format!(
                "way count must be positive, got {ways}"
            )));
        }
        Ok(Self {
            ways,
            sets: FxHashMap::default(),
            index: FxHashMap::with_capacity_and_hasher(ways, Default::default()),
            policy,
            #[cfg(feature = "metrics")]
            metrics: StoreMetrics::default(),
        })
    }

    /// Returns the way count (set count and per-set capacity).
    #[inline]
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Returns the replacement policy fixed at construction.
    #[inline]
    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    /// Returns the current number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no entries are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the total entry bound: `ways` sets of `ways` entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ways * self.ways
    }

    /// Checks presence without updating recency.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Set index a key routes to: its stable hash reduced mod `ways`.
    #[inline]
    fn set_index(&self, key: &K) -> usize {
        key.route_hash() as usize % self.ways
    }

    /// Stores a key-value pair, returning the previous value if the key
    /// was already present.
    ///
    /// An existing key is refreshed (moved to the head of its set) and
    /// overwritten in place; no eviction happens. A new key is routed to
    /// its set, which is created on first use; if that set is full, the
    /// replacement policy picks a victim among the existing occupants
    /// and the victim leaves both the set and the index before the new
    /// entry is inserted at the head.
    ///
    /// # Example
    ///
    /// ```
    /// use waycache::store::SetAssocCore;
    ///
    /// let mut cache = SetAssocCore::try_new(4).unwrap();
    /// assert_eq!(cache.put(1u64, "first"), None);
    /// assert_eq!(cache.put(1u64, "second"), Some("first"));
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&Location { set, id }) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_put_update();

            let list = self.sets.get_mut(&set)?;
            list.move_to_front(id);
            let entry = list.get_mut(id)?;
            return Some(std::mem::replace(&mut entry.value, value));
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_put_new();

        let set = self.set_index(&key);
        let ways = self.ways;
        let list = self
            .sets
            .entry(set)
            .or_insert_with(|| RecencyList::with_capacity(ways));

        if list.len() >= ways {
            // Victim is chosen on the pre-insertion state of the set.
            if let Some(victim) = self.policy.victim(list) {
                if let Some(evicted) = list.remove(victim) {
                    self.index.remove(&evicted.key);
                    #[cfg(feature = "metrics")]
                    self.metrics.record_eviction();
                }
            }
        }

        let id = list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, Location { set, id });
        None
    }

    /// Looks up a value by key, refreshing its recency on a hit.
    ///
    /// A lookup counts as the most recent touch under either policy;
    /// only the eviction-side rule differs between LRU and MRU.
    ///
    /// # Example
    ///
    /// ```
    /// use waycache::store::SetAssocCore;
    ///
    /// let mut cache = SetAssocCore::try_new(4).unwrap();
    /// cache.put(1u64, "one");
    ///
    /// assert_eq!(cache.get(&1), Some(&"one"));
    /// assert_eq!(cache.get(&99), None);
    /// ```
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let location = match self.index.get(key) {
            Some(&location) => location,
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                return None;
            }
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        let list = self.sets.get_mut(&location.set)?;
        list.move_to_front(location.id);
        list.get(location.id).map(|entry| &entry.value)
    }

    /// Removes a key from its set and the index, returning its value.
    ///
    /// Removing an absent key is a normal outcome, not an error.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let location = self.index.remove(key);

        #[cfg(feature = "metrics")]
        self.metrics.record_remove(location.is_some());

        let Location { set, id } = location?;
        let entry = self.sets.get_mut(&set)?.remove(id)?;
        Some(entry.value)
    }

    /// Removes all entries from every set and the index.
    pub fn clear(&mut self) {
        self.sets.clear();
        self.index.clear();
    }

    /// Iterates over all stored entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.sets
            .values()
            .flat_map(|list| list.iter().map(|entry| (&entry.key, &entry.value)))
    }

    /// Verifies the representation invariants, returning the first
    /// violation found.
    ///
    /// Checks that no set exceeds the way bound, that every set entry is
    /// indexed at its true location, that every index entry resolves to
    /// a live list entry for the same key, and that every entry sits in
    /// the set its hash routes to.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut in_sets = 0usize;
        for (&set_idx, list) in &self.sets {
            if list.len() > self.ways {
                return Err(InvariantError::new(format!(
                    "set {set_idx} holds {} entries, way bound is {}",
                    list.len(),
                    self.ways
                )));
            }
            in_sets += list.len();
            for entry in list.iter() {
                match self.index.get(&entry.key) {
                    None => {
                        return Err(InvariantError::new(format!(
                            "set {set_idx} holds a key missing from the index"
                        )))
                    }
                    Some(location) if location.set != set_idx => {
                        return Err(InvariantError::new(format!(
                            "index locates a key in set {} but it lives in set {set_idx}",
                            location.set
                        )))
                    }
                    Some(_) => {}
                }
                if self.set_index(&entry.key) != set_idx {
                    return Err(InvariantError::new(format!(
                        "set {set_idx} holds a key whose hash routes to set {}",
                        self.set_index(&entry.key)
                    )));
                }
            }
        }
        if in_sets != self.index.len() {
            return Err(InvariantError::new(format!(
                "index tracks {} keys but the sets hold {in_sets} entries",
                self.index.len()
            )));
        }
        for (key, location) in &self.index {
            let resolved = self
                .sets
                .get(&location.set)
                .and_then(|list| list.get(location.id));
            match resolved {
                Some(entry) if entry.key == *key => {}
                _ => {
                    return Err(InvariantError::new(
                        "index location does not resolve to a live entry for its key",
                    ))
                }
            }
        }
        Ok(())
    }
}

#[cfg(feature = "metrics")]
impl<K, V> SetAssocCore<K, V>
where
    K: CacheKey,
{
    /// Point-in-time view of the operation counters.
    pub fn metrics_snapshot(&self) -> StoreMetricsSnapshot {
        self.metrics.snapshot(self.len())
    }
}

impl<K, V> CoreCache<K, V> for SetAssocCore<K, V>
where
    K: CacheKey,
{
    #[inline]
    fn put(&mut self, key: K, value: V) -> Option<V> {
        SetAssocCore::put(self, key, value)
    }

    #[inline]
    fn get(&mut self, key: &K) -> Option<&V> {
        SetAssocCore::get(self, key)
    }

    #[inline]
    fn contains(&self, key: &K) -> bool {
        SetAssocCore::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        SetAssocCore::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        SetAssocCore::capacity(self)
    }

    #[inline]
    fn clear(&mut self) {
        SetAssocCore::clear(self)
    }
}

impl<K, V> MutableCache<K, V> for SetAssocCore<K, V>
where
    K: CacheKey,
{
    #[inline]
    fn remove(&mut self, key: &K) -> Option<V> {
        SetAssocCore::remove(self, key)
    }
}

impl<K, V> SnapshotCache<K, V> for SetAssocCore<K, V>
where
    K: CacheKey,
    V: Clone,
{
    fn entries(&self) -> HashMap<K, V> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K, V> Extend<(K, V)> for SetAssocCore<K, V>
where
    K: CacheKey,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K, V> fmt::Debug for SetAssocCore<K, V>
where
    K: CacheKey + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetAssocCore")
            .field("len", &self.len())
            .field("ways", &self.ways())
            .field("policy", &self.policy())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Concurrent wrapper
// ---------------------------------------------------------------------------

#[cfg(feature = "concurrency")]
use std::sync::Arc;

#[cfg(feature = "concurrency")]
use parking_lot::Mutex;

#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentCache;

/// Thread-safe set-associative cache.
///
/// Wraps a [`SetAssocCore`] behind a single `parking_lot::Mutex` held
/// for the full duration of each operation, so the set mutation and the
/// index mutation of one call are never visible half-applied to
/// another. Values are stored as `Arc<V>` and handed out by reference
/// count, so `get` and `entries` never clone user data.
///
/// Cloning the cache is cheap and shares the same underlying store;
/// independently constructed caches share nothing.
///
/// # Example
///
/// ```
/// use waycache::store::SetAssociativeCache;
///
/// let cache: SetAssociativeCache<u64, String> = SetAssociativeCache::try_new(4).unwrap();
/// cache.put(1, "one".to_string());
///
/// let value = cache.get(&1).unwrap();
/// assert_eq!(*value, "one");
///
/// let workers: Vec<_> = (0..4)
///     .map(|i| {
///         let cache = cache.clone();
///         std::thread::spawn(move || cache.put(i, format!("worker {i}")))
///     })
///     .collect();
/// for worker in workers {
///     worker.join().unwrap();
/// }
/// ```
#[cfg(feature = "concurrency")]
pub struct SetAssociativeCache<K, V>
where
    K: CacheKey,
{
    inner: Arc<Mutex<SetAssocCore<K, Arc<V>>>>,
}

#[cfg(feature = "concurrency")]
impl<K, V> SetAssociativeCache<K, V>
where
    K: CacheKey,
{
    /// Creates a cache with the given way count and LRU replacement.
    ///
    /// Fails if `ways` is zero.
    pub fn try_new(ways: usize) -> Result<Self, ConfigError> {
        Self::try_with_policy(ways, ReplacementPolicy::default())
    }

    /// Creates a cache with an explicit replacement policy.
    ///
    /// # Example
    ///
    /// ```
    /// use waycache::policy::ReplacementPolicy;
    /// use waycache::store::SetAssociativeCache;
    ///
    /// let cache =
    ///     SetAssociativeCache::<u64, i32>::try_with_policy(4, ReplacementPolicy::Mru).unwrap();
    /// assert_eq!(cache.policy(), ReplacementPolicy::Mru);
    /// ```
    pub fn try_with_policy(ways: usize, policy: ReplacementPolicy) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(SetAssocCore::try_with_policy(ways, policy)?)),
        })
    }

    /// Stores a value, wrapping it in `Arc<V>` internally.
    ///
    /// Returns the previous `Arc<V>` if the key was already present.
    pub fn put(&self, key: K, value: V) -> Option<Arc<V>> {
        self.put_arc(key, Arc::new(value))
    }

    /// Stores a pre-shared `Arc<V>` directly, without re-wrapping.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use waycache::store::SetAssociativeCache;
    ///
    /// let cache: SetAssociativeCache<u64, String> = SetAssociativeCache::try_new(4).unwrap();
    /// let shared = Arc::new("shared".to_string());
    /// cache.put_arc(1, Arc::clone(&shared));
    ///
    /// let fetched = cache.get(&1).unwrap();
    /// assert!(Arc::ptr_eq(&shared, &fetched));
    /// ```
    pub fn put_arc(&self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        let mut core = self.inner.lock();
        core.put(key, value)
    }

    /// Looks up a value, refreshing its recency on a hit.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let mut core = self.inner.lock();
        core.get(key).map(Arc::clone)
    }

    /// Removes a key, returning its value if it was present.
    ///
    /// Removing an absent key is a no-op, not an error.
    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        let mut core = self.inner.lock();
        core.remove(key)
    }

    /// Checks presence without updating recency.
    pub fn contains(&self, key: &K) -> bool {
        let core = self.inner.lock();
        core.contains(key)
    }

    /// Returns the current number of stored entries.
    pub fn len(&self) -> usize {
        let core = self.inner.lock();
        core.len()
    }

    /// Returns `true` if no entries are stored.
    pub fn is_empty(&self) -> bool {
        let core = self.inner.lock();
        core.is_empty()
    }

    /// Returns the way count (set count and per-set capacity).
    pub fn ways(&self) -> usize {
        let core = self.inner.lock();
        core.ways()
    }

    /// Returns the total entry bound: `ways` sets of `ways` entries.
    pub fn capacity(&self) -> usize {
        let core = self.inner.lock();
        core.capacity()
    }

    /// Returns the replacement policy fixed at construction.
    pub fn policy(&self) -> ReplacementPolicy {
        let core = self.inner.lock();
        core.policy()
    }

    /// Removes all entries.
    pub fn clear(&self) {
        let mut core = self.inner.lock();
        core.clear();
    }

    /// Verifies the representation invariants under the lock.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let core = self.inner.lock();
        core.check_invariants()
    }
}

#[cfg(all(feature = "concurrency", feature = "metrics"))]
impl<K, V> SetAssociativeCache<K, V>
where
    K: CacheKey,
{
    /// Point-in-time view of the operation counters.
    pub fn metrics_snapshot(&self) -> StoreMetricsSnapshot {
        let core = self.inner.lock();
        core.metrics_snapshot()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> SnapshotCache<K, Arc<V>> for SetAssociativeCache<K, V>
where
    K: CacheKey,
{
    /// Snapshot of every stored entry at a single consistent point in
    /// time: the lock is held while the map is built.
    fn entries(&self) -> HashMap<K, Arc<V>> {
        let core = self.inner.lock();
        core.iter()
            .map(|(key, value)| (key.clone(), Arc::clone(value)))
            .collect()
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> Clone for SetAssociativeCache<K, V>
where
    K: CacheKey,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<K, V> ConcurrentCache for SetAssociativeCache<K, V>
where
    K: CacheKey + Send,
    V: Send + Sync,
{
}

#[cfg(feature = "concurrency")]
impl<K, V> fmt::Debug for SetAssociativeCache<K, V>
where
    K: CacheKey + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.inner.lock();
        f.debug_struct("SetAssociativeCache")
            .field("len", &core.len())
            .field("ways", &core.ways())
            .field("policy", &core.policy())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Key whose canonical rendering is constant, so every instance
    /// routes to the same set. Identity still lives in `Eq`/`Hash`, and
    /// routing collisions between distinct keys are legal, which makes
    /// this the lever for exercising a single set deterministically.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct SameSet(u32);

    impl CacheKey for SameSet {
        const TYPE_TAG: &'static str = "sameset";

        fn write_canonical(&self, out: &mut String) {
            out.push_str("colliding");
        }
    }

    mod construction {
        use super::*;

        #[test]
        fn zero_ways_is_rejected() {
            let err = SetAssocCore::<u64, i32>::try_new(0).unwrap_err();
            assert!(err.to_string().contains("way count"));
        }

        #[test]
        fn default_policy_is_lru() {
            let cache = SetAssocCore::<u64, i32>::try_new(4).unwrap();
            assert_eq!(cache.policy(), ReplacementPolicy::Lru);
        }

        #[test]
        fn new_store_is_empty() {
            let cache = SetAssocCore::<u64, i32>::try_new(4).unwrap();
            assert_eq!(cache.len(), 0);
            assert!(cache.is_empty());
            assert_eq!(cache.ways(), 4);
            assert_eq!(cache.capacity(), 16);
        }
    }

    mod basic_behavior {
        use super::*;

        #[test]
        fn put_then_get_roundtrip() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            assert_eq!(cache.put(1u64, "one"), None);

            assert_eq!(cache.get(&1), Some(&"one"));
            assert_eq!(cache.get(&2), None);
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn put_existing_key_overwrites_in_place() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            cache.put(1u64, "first");

            assert_eq!(cache.put(1, "second"), Some("first"));
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.get(&1), Some(&"second"));
        }

        #[test]
        fn repeated_identical_put_is_idempotent() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            for _ in 0..10 {
                cache.put(SameSet(1), 7);
            }

            assert_eq!(cache.len(), 1);
            assert_eq!(cache.get(&SameSet(1)), Some(&7));
        }

        #[test]
        fn remove_present_and_absent() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            cache.put(1u64, "one");

            assert_eq!(cache.remove(&1), Some("one"));
            assert_eq!(cache.remove(&1), None);
            assert!(cache.is_empty());
        }

        #[test]
        fn contains_does_not_require_mut() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            cache.put(1u64, "one");

            assert!(cache.contains(&1));
            assert!(!cache.contains(&2));
        }

        #[test]
        fn clear_drops_everything() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            for key in 0u64..10 {
                cache.put(key, key);
            }

            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.get(&3), None);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn entries_snapshots_every_pair() {
            let mut cache = SetAssocCore::try_new(8).unwrap();
            cache.put(1u64, 10);
            cache.put(2u64, 20);

            let snapshot = cache.entries();
            assert_eq!(snapshot.len(), 2);
            assert_eq!(snapshot.get(&1), Some(&10));
            assert_eq!(snapshot.get(&2), Some(&20));
        }

        #[test]
        fn remove_of_absent_key_leaves_entries_unchanged() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            cache.put(1u64, 10);
            cache.put(2u64, 20);
            let before = cache.entries();

            cache.remove(&999);

            assert_eq!(cache.entries(), before);
        }

        #[test]
        fn extend_puts_every_pair() {
            let mut cache = SetAssocCore::try_new(8).unwrap();
            cache.extend((0u64..5).map(|k| (k, k * 10)));

            assert_eq!(cache.len(), 5);
            assert_eq!(cache.get(&4), Some(&40));
        }
    }

    mod eviction {
        use super::*;

        #[test]
        fn lru_evicts_least_recently_touched() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            for key in [1, 2, 3, 4] {
                cache.put(SameSet(key), key);
            }

            cache.put(SameSet(5), 5);

            assert!(!cache.contains(&SameSet(1)));
            for key in [2, 3, 4, 5] {
                assert!(cache.contains(&SameSet(key)));
            }
            assert_eq!(cache.len(), 4);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn lru_get_refreshes_the_eviction_candidate() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            for key in [1, 2, 3, 4] {
                cache.put(SameSet(key), key);
            }

            // 1 becomes most recent, 2 is now the victim-to-be.
            cache.get(&SameSet(1));
            cache.put(SameSet(5), 5);

            assert!(cache.contains(&SameSet(1)));
            assert!(!cache.contains(&SameSet(2)));
        }

        #[test]
        fn lru_showcase_sequence() {
            // Put sequence [1, 7, 9, 15, 9, 7, 45] into one set of four:
            // the re-puts of 9 and 7 refresh them, so 1 is the least
            // recently touched occupant when 45 arrives.
            let mut cache = SetAssocCore::try_new(4).unwrap();
            for key in [1, 7, 9, 15, 9, 7, 45] {
                cache.put(SameSet(key), key);
            }

            assert!(!cache.contains(&SameSet(1)));
            for key in [7, 9, 15, 45] {
                assert!(cache.contains(&SameSet(key)));
            }
            assert_eq!(cache.len(), 4);
        }

        #[test]
        fn mru_showcase_sequence() {
            // Same sequence under MRU: 7 sits at the head after its
            // re-put, so it is the victim when 45 arrives.
            let mut cache = SetAssocCore::try_with_policy(4, ReplacementPolicy::Mru).unwrap();
            for key in [1, 7, 9, 15, 9, 7, 45] {
                cache.put(SameSet(key), key);
            }

            assert!(!cache.contains(&SameSet(7)));
            for key in [1, 9, 15, 45] {
                assert!(cache.contains(&SameSet(key)));
            }
            assert_eq!(cache.len(), 4);
        }

        #[test]
        fn mru_evicts_most_recent_existing_occupant() {
            let mut cache = SetAssocCore::try_with_policy(4, ReplacementPolicy::Mru).unwrap();
            for key in [1, 2, 3, 4] {
                cache.put(SameSet(key), key);
            }

            // Victim is 4 (head before insertion), never the incoming 5.
            cache.put(SameSet(5), 5);

            assert!(!cache.contains(&SameSet(4)));
            for key in [1, 2, 3, 5] {
                assert!(cache.contains(&SameSet(key)));
            }
        }

        #[test]
        fn mru_lookup_marks_the_next_victim() {
            let mut cache = SetAssocCore::try_with_policy(4, ReplacementPolicy::Mru).unwrap();
            for key in [1, 2, 3, 4] {
                cache.put(SameSet(key), key);
            }

            cache.get(&SameSet(2));
            cache.put(SameSet(5), 5);

            assert!(!cache.contains(&SameSet(2)));
            for key in [1, 3, 4, 5] {
                assert!(cache.contains(&SameSet(key)));
            }
        }

        #[test]
        fn update_of_full_set_never_evicts() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            for key in [1, 2, 3, 4] {
                cache.put(SameSet(key), key);
            }

            cache.put(SameSet(3), 33);

            assert_eq!(cache.len(), 4);
            for key in [1, 2, 3, 4] {
                assert!(cache.contains(&SameSet(key)));
            }
            assert_eq!(cache.get(&SameSet(3)), Some(&33));
        }

        #[test]
        fn set_length_never_exceeds_way_bound() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            for key in 0..50 {
                cache.put(SameSet(key), key);
                assert!(cache.len() <= 4);
                cache.check_invariants().unwrap();
            }
        }

        #[test]
        fn single_way_store_holds_one_entry() {
            let mut cache = SetAssocCore::try_new(1).unwrap();
            cache.put(1u64, "one");
            cache.put(2u64, "two");

            assert_eq!(cache.len(), 1);
            assert!(!cache.contains(&1));
            assert_eq!(cache.get(&2), Some(&"two"));
        }
    }

    mod consistency {
        use super::*;

        #[test]
        fn mixed_workload_preserves_invariants() {
            let mut cache = SetAssocCore::try_new(8).unwrap();
            for key in 0u64..200 {
                cache.put(key, key * 3);
            }
            cache.check_invariants().unwrap();

            for key in (0u64..200).step_by(3) {
                cache.remove(&key);
            }
            cache.check_invariants().unwrap();

            for key in 0u64..200 {
                cache.get(&key);
            }
            cache.check_invariants().unwrap();

            assert!(cache.len() <= cache.capacity());
        }

        #[test]
        fn surviving_values_stay_attached_to_their_keys() {
            let mut cache = SetAssocCore::try_new(8).unwrap();
            for key in 0u64..500 {
                cache.put(key, key * 7);
            }

            for (key, value) in cache.entries() {
                assert_eq!(value, key * 7);
            }
        }
    }

    #[cfg(feature = "metrics")]
    mod metrics {
        use super::*;

        #[test]
        fn counters_track_the_workload() {
            let mut cache = SetAssocCore::try_new(4).unwrap();
            for key in [1, 2, 3, 4, 5] {
                cache.put(SameSet(key), key);
            }
            cache.put(SameSet(5), 55);
            cache.get(&SameSet(5));
            cache.get(&SameSet(1)); // evicted above, so a miss
            cache.remove(&SameSet(5));
            cache.remove(&SameSet(5));

            let snap = cache.metrics_snapshot();
            assert_eq!(snap.put_new, 5);
            assert_eq!(snap.put_updates, 1);
            assert_eq!(snap.evictions, 1);
            assert_eq!(snap.get_hits, 1);
            assert_eq!(snap.get_misses, 1);
            assert_eq!(snap.remove_found, 1);
            assert_eq!(snap.remove_missed, 1);
            assert_eq!(snap.len, 3);
        }
    }

    #[cfg(feature = "concurrency")]
    mod concurrent_wrapper {
        use super::*;

        #[test]
        fn put_get_roundtrip_through_the_lock() {
            let cache: SetAssociativeCache<u64, String> =
                SetAssociativeCache::try_new(4).unwrap();
            cache.put(1, "one".to_string());

            assert_eq!(cache.get(&1).as_deref().map(String::as_str), Some("one"));
            assert_eq!(cache.get(&2), None);
        }

        #[test]
        fn put_arc_shares_the_allocation() {
            let cache: SetAssociativeCache<u64, String> =
                SetAssociativeCache::try_new(4).unwrap();
            let shared = Arc::new("shared".to_string());

            cache.put_arc(1, Arc::clone(&shared));
            let fetched = cache.get(&1).unwrap();
            assert!(Arc::ptr_eq(&shared, &fetched));
        }

        #[test]
        fn clones_share_one_store() {
            let cache: SetAssociativeCache<u64, i32> = SetAssociativeCache::try_new(4).unwrap();
            let clone = cache.clone();

            cache.put(1, 10);
            assert_eq!(clone.get(&1).as_deref(), Some(&10));
            assert_eq!(clone.len(), 1);
        }

        #[test]
        fn independent_caches_share_nothing() {
            let a: SetAssociativeCache<u64, i32> = SetAssociativeCache::try_new(4).unwrap();
            let b: SetAssociativeCache<u64, i32> = SetAssociativeCache::try_new(4).unwrap();

            a.put(1, 10);
            assert!(b.is_empty());
            assert_eq!(b.get(&1), None);
        }

        #[test]
        fn entries_snapshot_through_the_lock() {
            use crate::traits::SnapshotCache;

            let cache: SetAssociativeCache<u64, i32> = SetAssociativeCache::try_new(8).unwrap();
            cache.put(1, 10);
            cache.put(2, 20);

            let snapshot = cache.entries();
            assert_eq!(snapshot.len(), 2);
            assert_eq!(snapshot.get(&1).map(|v| **v), Some(10));
        }

        #[test]
        fn invariants_hold_behind_the_wrapper() {
            let cache: SetAssociativeCache<u64, u64> = SetAssociativeCache::try_new(4).unwrap();
            for key in 0..100 {
                cache.put(key, key);
            }
            cache.remove(&3);
            cache.check_invariants().unwrap();
        }
    }
}
