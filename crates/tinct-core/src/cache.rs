//! Bounded key/value store with LRU, LFU, or FIFO eviction.
//!
//! Entries live in a `HashMap`; a `BTreeMap` keyed by each entry's eviction
//! rank keeps the next victim at its front, so every operation is
//! `O(log n)`. The rank depends on the strategy:
//!
//! | Strategy | Rank               | Victim                                   |
//! |----------|--------------------|------------------------------------------|
//! | LRU      | `(tick, 0)`        | least recently touched                   |
//! | LFU      | `(frequency, seq)` | lowest frequency, then oldest insertion  |
//! | FIFO     | `(seq, 0)`         | oldest insertion, regardless of access   |
//!
//! Ticks and sequence numbers are unique, so ranks never collide and the
//! victim is always deterministic.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{SnapshotError, StrategyLocked};

/// Eviction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionStrategy {
    #[default]
    Lru,
    Lfu,
    Fifo,
}

impl EvictionStrategy {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Lru => "lru",
            Self::Lfu => "lfu",
            Self::Fifo => "fifo",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Lru, Self::Lfu, Self::Fifo]
    }
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for [`EvictionStrategy::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown eviction strategy `{0}` (expected lru, lfu, or fifo)")]
pub struct UnknownStrategy(pub String);

impl FromStr for EvictionStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|strategy| strategy.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Capacity and policy for a [`Cache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Live entry bound; values below 1 are treated as 1.
    pub max_size: usize,
    pub strategy: EvictionStrategy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 512,
            strategy: EvictionStrategy::Lru,
        }
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    /// `size / max_size`.
    pub utilization: f64,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0 before the first lookup.
    pub hit_rate: f64,
    pub evictions: u64,
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    frequency: u64,
    last_access: u64,
    seq: u64,
}

type Rank = (u64, u64);

#[derive(Serialize, Deserialize)]
struct SnapshotRecord<K, V> {
    key: K,
    value: V,
}

/// Bounded map with strategy-driven eviction and hit/miss accounting.
pub struct Cache<K, V> {
    entries: HashMap<K, Entry<V>>,
    /// Eviction rank → key; the first entry is the next victim.
    ranks: BTreeMap<Rank, K>,
    /// Insertion sequence → key, for snapshots and `keys()`.
    insertion: BTreeMap<u64, K>,
    max_size: usize,
    strategy: EvictionStrategy,
    tick: u64,
    next_seq: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("strategy", &self.strategy)
            .field("max_size", &self.max_size)
            .field("len", &self.entries.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .field("evictions", &self.evictions)
            .finish()
    }
}

impl<K: Hash + Eq + Clone, V> Cache<K, V> {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            ranks: BTreeMap::new(),
            insertion: BTreeMap::new(),
            max_size: config.max_size.max(1),
            strategy: config.strategy,
            tick: 0,
            next_seq: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    #[must_use]
    pub fn with_capacity(max_size: usize, strategy: EvictionStrategy) -> Self {
        Self::new(CacheConfig { max_size, strategy })
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Bump frequency and recency of a present key and re-rank it.
    fn touch(&mut self, key: &K) {
        let tick = self.next_tick();
        let strategy = self.strategy;
        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };
        let old = rank_for(strategy, entry);
        entry.frequency += 1;
        entry.last_access = tick;
        let new = rank_for(strategy, entry);
        if old == new {
            return;
        }
        if let Some(k) = self.ranks.remove(&old) {
            self.ranks.insert(new, k);
        }
    }

    /// Look up `key`, counting a hit or miss and refreshing its metadata.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if self.entries.contains_key(key) {
            self.hits += 1;
            self.touch(key);
            self.entries.get(key).map(|e| &e.value)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Look up `key` without touching statistics or eviction order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    pub fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace. A new key at capacity first evicts one entry,
    /// which is returned.
    pub fn set(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.value = value;
            self.touch(&key);
            return None;
        }

        let evicted = if self.entries.len() >= self.max_size {
            self.evict_one()
        } else {
            None
        };

        let seq = self.next_seq;
        self.next_seq += 1;
        let entry = Entry {
            value,
            frequency: 1,
            last_access: self.next_tick(),
            seq,
        };
        self.ranks.insert(rank_for(self.strategy, &entry), key.clone());
        self.insertion.insert(seq, key.clone());
        self.entries.insert(key, entry);
        evicted
    }

    /// Return the cached value, computing and inserting it on a miss.
    pub fn get_or_insert_with(&mut self, key: K, f: impl FnOnce() -> V) -> &V {
        if self.entries.contains_key(&key) {
            self.hits += 1;
            self.touch(&key);
        } else {
            self.misses += 1;
            self.set(key.clone(), f());
        }
        &self.entries[&key].value
    }

    pub fn delete(&mut self, key: &K) -> Option<V> {
        let entry = self.entries.remove(key)?;
        self.ranks.remove(&rank_for(self.strategy, &entry));
        self.insertion.remove(&entry.seq);
        Some(entry.value)
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.ranks.clear();
        self.insertion.clear();
    }

    fn evict_one(&mut self) -> Option<(K, V)> {
        let (_, key) = self.ranks.pop_first()?;
        let entry = self.entries.remove(&key)?;
        self.insertion.remove(&entry.seq);
        self.evictions += 1;
        tracing::debug!(
            strategy = %self.strategy,
            size = self.entries.len(),
            max_size = self.max_size,
            "cache evicted entry"
        );
        Some((key, entry.value))
    }

    /// Change capacity, evicting by strategy until the cache fits.
    pub fn resize(&mut self, max_size: usize) -> Vec<(K, V)> {
        self.max_size = max_size.max(1);
        let mut evicted = Vec::new();
        while self.entries.len() > self.max_size {
            match self.evict_one() {
                Some(pair) => evicted.push(pair),
                None => break,
            }
        }
        evicted
    }

    /// Switch policy. Only allowed while the cache is empty; a populated
    /// cache keeps its current strategy.
    pub fn set_strategy(&mut self, strategy: EvictionStrategy) -> Result<(), StrategyLocked> {
        if !self.entries.is_empty() {
            return Err(StrategyLocked {
                len: self.entries.len(),
            });
        }
        self.strategy = strategy;
        Ok(())
    }

    pub fn strategy(&self) -> EvictionStrategy {
        self.strategy
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.insertion.values()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            size: self.entries.len(),
            max_size: self.max_size,
            utilization: self.entries.len() as f64 / self.max_size as f64,
            hits: self.hits,
            misses: self.misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
            evictions: self.evictions,
        }
    }

    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }

    /// Entries in insertion order.
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.insertion
            .values()
            .filter_map(|k| self.entries.get(k).map(|e| (k.clone(), e.value.clone())))
            .collect()
    }

    /// Replace the contents by replaying `set` in order. Eviction metadata
    /// is rebuilt from scratch.
    pub fn restore(&mut self, entries: impl IntoIterator<Item = (K, V)>) {
        self.clear();
        let mut count = 0usize;
        for (key, value) in entries {
            self.set(key, value);
            count += 1;
        }
        if count > self.max_size {
            tracing::warn!(
                count,
                max_size = self.max_size,
                "restored snapshot exceeds capacity, earlier entries were evicted"
            );
        }
    }

    /// Serialize as a JSON array of `{key, value}` records.
    pub fn snapshot_json(&self) -> Result<String, SnapshotError>
    where
        K: Serialize,
        V: Serialize,
    {
        let records: Vec<SnapshotRecord<&K, &V>> = self
            .insertion
            .values()
            .filter_map(|k| self.entries.get(k).map(|e| SnapshotRecord { key: k, value: &e.value }))
            .collect();
        Ok(serde_json::to_string(&records)?)
    }

    /// Restore from [`snapshot_json`](Self::snapshot_json) output. Returns
    /// the number of records replayed.
    pub fn restore_json(&mut self, json: &str) -> Result<usize, SnapshotError>
    where
        K: DeserializeOwned,
        V: DeserializeOwned,
    {
        let records: Vec<SnapshotRecord<K, V>> = serde_json::from_str(json)?;
        let count = records.len();
        self.restore(records.into_iter().map(|r| (r.key, r.value)));
        Ok(count)
    }
}

fn rank_for<V>(strategy: EvictionStrategy, entry: &Entry<V>) -> Rank {
    match strategy {
        EvictionStrategy::Lru => (entry.last_access, 0),
        EvictionStrategy::Lfu => (entry.frequency, entry.seq),
        EvictionStrategy::Fifo => (entry.seq, 0),
    }
}

/// A [`Cache`] behind one lock, cloneable across threads. Lookups return
/// clones since no reference can outlive the lock.
pub struct SharedCache<K, V> {
    inner: Arc<Mutex<Cache<K, V>>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> SharedCache<K, V> {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Cache::new(config))),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    pub fn set(&self, key: K, value: V) -> Option<(K, V)> {
        self.inner.lock().set(key, value)
    }

    pub fn has(&self, key: &K) -> bool {
        self.inner.lock().has(key)
    }

    pub fn delete(&self, key: &K) -> Option<V> {
        self.inner.lock().delete(key)
    }

    /// `f` runs with the lock held, so concurrent callers never compute the
    /// same key twice.
    pub fn get_or_insert_with(&self, key: K, f: impl FnOnce() -> V) -> V {
        self.inner.lock().get_or_insert_with(key, f).clone()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    /// Run `f` with the lock held.
    pub fn with<R>(&self, f: impl FnOnce(&mut Cache<K, V>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
