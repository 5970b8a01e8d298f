//! Internal data structures backing the cache sets.

mod recency_list;

pub use recency_list::{EntryId, RecencyList};
