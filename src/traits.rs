//! Capability traits for the cache surface.
//!
//! The hierarchy keeps each consumer bound to exactly the operations it
//! needs:
//!
//! ```text
//!          ┌─────────────────────────────────────┐
//!          │           CoreCache<K, V>           │
//!          │                                     │
//!          │  put(&mut, K, V) → Option<V>        │
//!          │  get(&mut, &K) → Option<&V>         │
//!          │  contains(&, &K) → bool             │
//!          │  len(&) / is_empty(&) / capacity(&) │
//!          │  clear(&mut)                        │
//!          └──────────────────┬──────────────────┘
//!                             │
//!              ┌──────────────┴──────────────┐
//!              ▼                             ▼
//!   ┌───────────────────────┐   ┌─────────────────────────┐
//!   │   MutableCache<K, V>  │   │   SnapshotCache<K, V>   │
//!   │                       │   │                         │
//!   │  remove(&K)→Option<V> │   │  entries() → HashMap    │
//!   │  remove_batch(&[K])   │   │                         │
//!   └───────────────────────┘   └─────────────────────────┘
//!
//!   ConcurrentCache: Send + Sync marker for thread-safe stores
//! ```
//!
//! [`SetAssocCore`](crate::store::SetAssocCore) implements all three
//! object traits; the concurrent wrapper implements the marker and
//! `SnapshotCache` (its other operations take `&self` and live as
//! inherent methods).

use std::collections::HashMap;

/// Core operations every cache store supports.
///
/// # Example
///
/// ```
/// use waycache::store::SetAssocCore;
/// use waycache::traits::CoreCache;
///
/// fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.put(*key, value.clone());
///     }
/// }
///
/// let mut cache = SetAssocCore::try_new(4).unwrap();
/// warm(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Stores a key-value pair, returning the previous value if the key
    /// was already present.
    ///
    /// An update refreshes recency and never evicts; a new key may
    /// displace a victim chosen by the store's replacement policy.
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Looks up a value by key.
    ///
    /// A hit counts as a touch: the entry becomes the most recently
    /// used in its set. Use [`contains`](Self::contains) to probe
    /// without affecting recency.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks presence without updating recency.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of stored entries.
    fn len(&self) -> usize;

    /// Returns `true` if no entries are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries the store can hold.
    fn capacity(&self) -> usize;

    /// Removes all entries.
    fn clear(&mut self);
}

/// Caches that support arbitrary key-based removal.
///
/// # Example
///
/// ```
/// use waycache::store::SetAssocCore;
/// use waycache::traits::{CoreCache, MutableCache};
///
/// let mut cache = SetAssocCore::try_new(4).unwrap();
/// cache.put(1u64, "one");
///
/// assert_eq!(cache.remove(&1), Some("one"));
/// assert_eq!(cache.remove(&1), None); // absent keys are a normal outcome
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a key, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes several keys, returning each outcome in input order.
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|k| self.remove(k)).collect()
    }
}

/// Caches that can export all entries at a single point in time.
///
/// The returned map reflects one consistent state: no concurrently
/// completing operation is half-visible in it.
pub trait SnapshotCache<K, V> {
    /// Returns every stored key with its value, in no particular order.
    fn entries(&self) -> HashMap<K, V>;
}

/// Marker trait for caches that are safe to share across threads.
///
/// # Example
///
/// ```
/// use waycache::traits::ConcurrentCache;
///
/// fn spawn_workers<C: ConcurrentCache + Clone + 'static>(cache: &C) {
///     let worker = cache.clone();
///     std::thread::spawn(move || drop(worker)).join().unwrap();
/// }
/// ```
pub trait ConcurrentCache: Send + Sync {}
