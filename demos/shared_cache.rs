//! Sharing one cache across threads through the concurrent wrapper.
//!
//! Run with: cargo run --example shared_cache

use std::sync::Arc;
use std::thread;

use waycache::store::SetAssociativeCache;
use waycache::traits::SnapshotCache;

fn main() {
    let cache: SetAssociativeCache<u64, String> = SetAssociativeCache::try_new(8).unwrap();

    let workers: Vec<_> = (0..4u64)
        .map(|worker| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..16 {
                    cache.put(worker * 16 + i, format!("worker-{worker}"));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    println!("stored {} of {} slots", cache.len(), cache.capacity());

    // Values come back as Arc<V>; a pre-shared allocation is reused as-is.
    let shared = Arc::new("shared".to_string());
    cache.put_arc(1_000, Arc::clone(&shared));
    let fetched = cache.get(&1_000).unwrap();
    println!("same allocation? {}", Arc::ptr_eq(&shared, &fetched));

    // One consistent snapshot of everything currently stored.
    let snapshot = cache.entries();
    println!("snapshot holds {} entries", snapshot.len());

    cache.check_invariants().unwrap();
    println!("invariants ok");
}
