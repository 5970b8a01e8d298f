//! Walkthrough of the set-associative store under LRU replacement.
//!
//! Run with: cargo run --example basic_lru

use waycache::key::CacheKey;
use waycache::store::SetAssocCore;

/// Pins every key to one set so the eviction order is easy to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Demo(u32);

impl CacheKey for Demo {
    const TYPE_TAG: &'static str = "demo";

    fn write_canonical(&self, out: &mut String) {
        out.push_str("demo");
    }
}

fn main() {
    let mut cache = SetAssocCore::try_new(4).unwrap();

    // Fill one set of four.
    for key in [1, 7, 9, 15] {
        cache.put(Demo(key), key * 100);
    }
    println!("filled: len={}", cache.len());

    // A lookup refreshes recency, so 9 is now safest from eviction.
    if let Some(value) = cache.get(&Demo(9)) {
        println!("hit 9: {value}");
    }

    // The set is full; 45 displaces the least recently touched key (1).
    cache.put(Demo(45), 4500);

    println!("contains 1? {}", cache.contains(&Demo(1)));
    println!("contains 9? {}", cache.contains(&Demo(9)));
    println!("len after eviction: {}", cache.len());
}

// Expected output:
// filled: len=4
// hit 9: 900
// contains 1? false
// contains 9? true
// len after eviction: 4
//
// Explanation: ways=4; after get(&9), key 1 is the least recently
// touched occupant. Inserting key 45 evicts it, so contains(1) is false.
