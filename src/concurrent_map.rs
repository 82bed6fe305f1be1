//! A fixed-bucket-count concurrent map used by the parallel ranker to
//! accumulate relevance scores without serializing every update behind a
//! single lock.
//!
//! A sharded concurrent map (`dashmap::DashMap`-shaped: partition by hash,
//! lock per bucket) shows up elsewhere in this codebase's lineage for
//! exactly this reason. Hand-rolled here rather than a `DashMap` because
//! `build_ordinary` needs to take every bucket lock in a fixed total order
//! and concatenate in key order, which `DashMap` doesn't expose directly.

use ahash::AHashMap;
use parking_lot::{Mutex, MutexGuard};
use std::hash::{BuildHasher, Hash};
use std::ops::{Deref, DerefMut};

/// Concurrent `K -> f64` map partitioned into `bucket_count` independently
/// locked buckets. Additive updates to distinct keys in distinct buckets
/// proceed without contending on each other's locks; updates to the same
/// key are serialized through that key's bucket lock.
pub struct ConcurrentAccumulator<K: Eq + Hash> {
    buckets: Vec<Mutex<AHashMap<K, f64>>>,
    hasher: ahash::RandomState,
}

/// A scoped mutable reference to a single entry, held while its bucket's
/// lock is taken. Dropping it releases the lock.
pub struct EntryGuard<'a, K: Eq + Hash> {
    guard: MutexGuard<'a, AHashMap<K, f64>>,
    key: K,
}

impl<'a, K: Eq + Hash + Clone> Deref for EntryGuard<'a, K> {
    type Target = f64;

    fn deref(&self) -> &f64 {
        self.guard.get(&self.key).expect("entry was inserted before the guard was returned")
    }
}

impl<'a, K: Eq + Hash + Clone> DerefMut for EntryGuard<'a, K> {
    fn deref_mut(&mut self) -> &mut f64 {
        self.guard.get_mut(&self.key).expect("entry was inserted before the guard was returned")
    }
}

impl<K: Eq + Hash + Clone> ConcurrentAccumulator<K> {
    /// Creates an accumulator with `bucket_count` buckets. `bucket_count`
    /// must be at least 1.
    pub fn new(bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1);
        Self {
            buckets: (0..bucket_count).map(|_| Mutex::new(AHashMap::default())).collect(),
            hasher: ahash::RandomState::new(),
        }
    }

    fn bucket_index(&self, key: &K) -> usize {
        (self.hasher.hash_one(key) as usize) % self.buckets.len()
    }

    /// Returns a guarded mutable reference to `key`'s accumulated value,
    /// inserting a zero entry first if absent. Locks only `key`'s bucket;
    /// concurrent `at_mut` calls on keys in different buckets proceed in
    /// parallel.
    pub fn at_mut(&self, key: K) -> EntryGuard<'_, K> {
        let idx = self.bucket_index(&key);
        let mut guard = self.buckets[idx].lock();
        guard.entry(key.clone()).or_insert(0.0);
        EntryGuard { guard, key }
    }

    /// Removes `key` if present. Locks only `key`'s bucket; atomic with
    /// respect to other operations on that key.
    pub fn erase(&self, key: &K) {
        let idx = self.bucket_index(key);
        self.buckets[idx].lock().remove(key);
    }

    /// Locks every bucket, in bucket-index order (a fixed total order, to
    /// avoid deadlocking against concurrent single-bucket operations which
    /// hold at most one lock), and concatenates the result.
    pub fn build_ordinary(&self) -> AHashMap<K, f64> {
        let mut result = AHashMap::default();
        for bucket in &self.buckets {
            let guard = bucket.lock();
            for (k, v) in guard.iter() {
                result.insert(k.clone(), *v);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn at_mut_inserts_zero_then_accumulates() {
        let map: ConcurrentAccumulator<i32> = ConcurrentAccumulator::new(4);
        *map.at_mut(1) += 2.0;
        *map.at_mut(1) += 3.0;
        assert_eq!(map.build_ordinary().get(&1), Some(&5.0));
    }

    #[test]
    fn erase_removes_key() {
        let map: ConcurrentAccumulator<i32> = ConcurrentAccumulator::new(4);
        *map.at_mut(7) += 1.0;
        map.erase(&7);
        assert!(map.build_ordinary().get(&7).is_none());
    }

    #[test]
    fn erase_of_absent_key_is_a_no_op() {
        let map: ConcurrentAccumulator<i32> = ConcurrentAccumulator::new(4);
        map.erase(&7);
        assert!(map.build_ordinary().is_empty());
    }

    #[test]
    fn concurrent_updates_to_distinct_keys_all_land() {
        let map: ConcurrentAccumulator<i32> = ConcurrentAccumulator::new(8);
        thread::scope(|scope| {
            for k in 0..64 {
                let map = &map;
                scope.spawn(move || {
                    for _ in 0..100 {
                        *map.at_mut(k) += 1.0;
                    }
                });
            }
        });
        let built = map.build_ordinary();
        for k in 0..64 {
            assert_eq!(built.get(&k), Some(&100.0));
        }
    }

    #[test]
    fn single_bucket_still_serializes_correctly() {
        let map: ConcurrentAccumulator<i32> = ConcurrentAccumulator::new(1);
        thread::scope(|scope| {
            for _ in 0..8 {
                let map = &map;
                scope.spawn(move || {
                    for _ in 0..50 {
                        *map.at_mut(0) += 1.0;
                    }
                });
            }
        });
        assert_eq!(map.build_ordinary().get(&0), Some(&400.0));
    }
}
