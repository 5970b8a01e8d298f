//! Walkthrough of the set-associative store under MRU replacement.
//!
//! MRU evicts the **most** recently touched occupant when a set fills.
//! That suits cyclic scans where the least recent entry is the one most
//! likely to be needed again, and little else.
//!
//! Run with: cargo run --example basic_mru

use waycache::key::CacheKey;
use waycache::policy::ReplacementPolicy;
use waycache::store::SetAssocCore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Demo(u32);

impl CacheKey for Demo {
    const TYPE_TAG: &'static str = "demo";

    fn write_canonical(&self, out: &mut String) {
        out.push_str("demo");
    }
}

fn main() {
    let mut cache = SetAssocCore::try_with_policy(4, ReplacementPolicy::Mru).unwrap();

    for key in [1, 2, 3, 4] {
        cache.put(Demo(key), key);
    }
    println!("filled: len={}", cache.len());

    // Touching 2 moves it to the head, which under MRU marks it as the
    // next victim.
    cache.get(&Demo(2));
    cache.put(Demo(5), 5);

    println!("contains 2? {}", cache.contains(&Demo(2)));
    println!("contains 5? {}", cache.contains(&Demo(5)));

    // The victim is always picked among the existing occupants; the
    // incoming entry itself is never evicted.
    cache.put(Demo(6), 6);
    println!("contains 6? {}", cache.contains(&Demo(6)));
    println!("contains 5? {}", cache.contains(&Demo(5)));
}

// Expected output:
// filled: len=4
// contains 2? false
// contains 5? true
// contains 6? true
// contains 5? false
//
// Explanation: get(&2) makes 2 the head of the set, so inserting 5
// evicts 2. Inserting 6 then evicts 5, the most recent occupant at
// that point; 6 itself lands at the head untouched.
