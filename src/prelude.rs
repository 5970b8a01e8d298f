pub use crate::ds::{EntryId, RecencyList};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::key::{CacheKey, F32Key, F64Key};
pub use crate::policy::ReplacementPolicy;
pub use crate::store::SetAssocCore;
pub use crate::traits::{ConcurrentCache, CoreCache, MutableCache, SnapshotCache};

#[cfg(feature = "concurrency")]
pub use crate::store::SetAssociativeCache;
#[cfg(feature = "metrics")]
pub use crate::metrics::StoreMetricsSnapshot;
