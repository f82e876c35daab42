//! Concurrent multi-map used for both the size index and the hash index.
//!
//! [`BucketIndex`] wraps a sharded [`DashMap`]. The only mutation it offers
//! is [`BucketIndex::append`], which fetches or creates the bucket for a key
//! and pushes one value while holding that key's shard lock. Writers to
//! different shards never contend, and no caller can hold a bucket across
//! I/O because bucket references are never handed out.

use std::hash::Hash;

use dashmap::DashMap;

/// Multi-map from a key to every value appended under it.
#[derive(Debug)]
pub struct BucketIndex<K, V>
where
    K: Eq + Hash,
{
    buckets: DashMap<K, Vec<V>>,
}

impl<K, V> Default for BucketIndex<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> BucketIndex<K, V>
where
    K: Eq + Hash,
{
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Append `value` to the bucket for `key`, creating it if needed.
    pub fn append(&self, key: K, value: V) {
        self.buckets.entry(key).or_default().push(value);
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no value has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of values stored under `key`.
    #[must_use]
    pub fn bucket_len(&self, key: &K) -> usize {
        self.buckets.get(key).map_or(0, |bucket| bucket.len())
    }

    /// Total number of values across all buckets.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.len()).sum()
    }

    /// Consume the index, yielding every bucket.
    ///
    /// Iteration order is unspecified.
    pub fn into_buckets(self) -> impl Iterator<Item = (K, Vec<V>)> {
        self.buckets.into_iter()
    }
}
