//! Reuse arena for small scratch structs.
//!
//! A pool is a free list plus counters. Objects carry no in-use flag: an
//! object is free exactly when it sits in the free list. `acquire` never
//! blocks; an empty free list falls through to the factory.
//!
//! [`ObjectPool`] itself is unsynchronized. Give each worker its own pool,
//! or share one through [`SharedPool`], which puts a single lock around it.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Hit rate at or above which `optimize` considers growing the pool.
const OPTIMIZE_HIT_RATE: f64 = 0.8;
/// Utilization at or below which `optimize` considers growing the pool.
const OPTIMIZE_UTILIZATION: f64 = 0.5;
/// Fewer lookups than this are not enough signal to resize on.
const OPTIMIZE_MIN_SAMPLES: u64 = 16;
/// `optimize` never grows past this multiple of the configured `max_size`.
const OPTIMIZE_GROWTH_LIMIT: usize = 4;

/// Sizing for an [`ObjectPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Upper bound on the free list.
    pub max_size: usize,
    /// Objects allocated up front by the constructor.
    pub initial_size: usize,
    /// Free objects kept by [`ObjectPool::shrink`].
    pub min_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 64,
            initial_size: 8,
            min_size: 0,
        }
    }
}

/// Point-in-time pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    /// Objects currently in the free list.
    pub pool_size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0 before the first acquire.
    pub hit_rate: f64,
    /// Total factory calls, including prewarming.
    pub allocated: u64,
    /// Outstanding objects as a fraction of `max_size`.
    pub utilization: f64,
}

/// What [`ObjectPool::optimize`] decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeOutcome {
    Unchanged,
    Grew { from: usize, to: usize },
}

/// A bounded free list of reusable `T`s.
pub struct ObjectPool<T> {
    free: Vec<T>,
    factory: Box<dyn Fn() -> T + Send>,
    reset: Option<Box<dyn Fn(&mut T) + Send>>,
    config: PoolConfig,
    max_size: usize,
    hits: u64,
    misses: u64,
    allocated: u64,
    in_use: usize,
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("free", &self.free.len())
            .field("in_use", &self.in_use)
            .field("max_size", &self.max_size)
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish_non_exhaustive()
    }
}

impl<T> ObjectPool<T> {
    /// Create a pool and prewarm `config.initial_size` objects.
    #[must_use]
    pub fn new(config: PoolConfig, factory: impl Fn() -> T + Send + 'static) -> Self {
        let mut pool = Self {
            free: Vec::with_capacity(config.initial_size.min(config.max_size)),
            factory: Box::new(factory),
            reset: None,
            config,
            max_size: config.max_size,
            hits: 0,
            misses: 0,
            allocated: 0,
            in_use: 0,
        };
        pool.prewarm(config.initial_size);
        pool
    }

    /// Run `reset` on every object as it comes back.
    #[must_use]
    pub fn with_reset(mut self, reset: impl Fn(&mut T) + Send + 'static) -> Self {
        self.reset = Some(Box::new(reset));
        self
    }

    /// Pop a free object, or build a new one if the free list is empty.
    pub fn acquire(&mut self) -> T {
        self.in_use += 1;
        if let Some(obj) = self.free.pop() {
            self.hits += 1;
            return obj;
        }
        self.misses += 1;
        self.allocated += 1;
        tracing::trace!(allocated = self.allocated, "pool miss, allocating");
        (self.factory)()
    }

    /// Return an object. Once the free list holds `max_size` objects,
    /// further releases drop their argument.
    pub fn release(&mut self, mut obj: T) {
        self.in_use = self.in_use.saturating_sub(1);
        if self.free.len() >= self.max_size {
            return;
        }
        if let Some(reset) = &self.reset {
            reset(&mut obj);
        }
        self.free.push(obj);
    }

    pub fn release_many(&mut self, objs: impl IntoIterator<Item = T>) {
        for obj in objs {
            self.release(obj);
        }
    }

    /// Allocate up to `n` fresh objects into the free list, stopping at
    /// `max_size`. Returns how many were allocated.
    pub fn prewarm(&mut self, n: usize) -> usize {
        let room = self.max_size.saturating_sub(self.free.len());
        let count = n.min(room);
        for _ in 0..count {
            self.free.push((self.factory)());
        }
        self.allocated += count as u64;
        count
    }

    /// Bring the free list to exactly `min_size` (capped by `max_size`).
    pub fn shrink(&mut self) {
        let target = self.config.min_size.min(self.max_size);
        if self.free.len() > target {
            self.free.truncate(target);
        } else {
            self.prewarm(target - self.free.len());
        }
    }

    /// Drop every free object. Outstanding objects are unaffected.
    pub fn clear(&mut self) {
        self.free.clear();
    }

    /// Grow `max_size` when the pool is serving nearly every request while
    /// most of its capacity sits idle, so bursts above the current bound
    /// are kept rather than dropped.
    ///
    /// Growth is 25% (at least one slot) per call, up to four times the
    /// configured size. The bound never drops below the outstanding count.
    pub fn optimize(&mut self) -> OptimizeOutcome {
        let lookups = self.hits + self.misses;
        let stats = self.stats();
        let limit = self.config.max_size.saturating_mul(OPTIMIZE_GROWTH_LIMIT);

        if lookups < OPTIMIZE_MIN_SAMPLES
            || stats.hit_rate < OPTIMIZE_HIT_RATE
            || stats.utilization > OPTIMIZE_UTILIZATION
            || self.max_size >= limit
        {
            return OptimizeOutcome::Unchanged;
        }

        let from = self.max_size;
        let to = (from + (from / 4).max(1)).min(limit).max(self.in_use);
        self.max_size = to;
        tracing::debug!(from, to, hit_rate = stats.hit_rate, "pool grew");
        OptimizeOutcome::Grew { from, to }
    }

    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let lookups = self.hits + self.misses;
        PoolStats {
            pool_size: self.free.len(),
            max_size: self.max_size,
            hits: self.hits,
            misses: self.misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                self.hits as f64 / lookups as f64
            },
            allocated: self.allocated,
            utilization: if self.max_size == 0 {
                0.0
            } else {
                self.in_use as f64 / self.max_size as f64
            },
        }
    }

    /// Objects currently in the free list.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Objects acquired and not yet released.
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Current bound, which `optimize` may have raised above the config.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Acquire an object that is released when the guard drops.
    pub fn borrow(&mut self) -> Pooled<'_, T> {
        let obj = self.acquire();
        Pooled {
            pool: self,
            obj: Some(obj),
        }
    }
}

/// Scoped loan from an [`ObjectPool`]; released on drop, including unwinds.
pub struct Pooled<'a, T> {
    pool: &'a mut ObjectPool<T>,
    obj: Option<T>,
}

impl<T> Pooled<'_, T> {
    /// Keep the object instead of returning it to the pool.
    pub fn detach(mut self) -> T {
        self.pool.in_use = self.pool.in_use.saturating_sub(1);
        // `obj` is only taken here and in `drop`.
        self.obj.take().unwrap_or_else(|| (self.pool.factory)())
    }
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.obj.as_ref().unwrap_or_else(|| unreachable!("pooled object taken"))
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.obj.as_mut().unwrap_or_else(|| unreachable!("pooled object taken"))
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(obj) = self.obj.take() {
            self.pool.release(obj);
        }
    }
}

/// An [`ObjectPool`] behind one lock, cloneable across threads.
pub struct SharedPool<T> {
    inner: Arc<Mutex<ObjectPool<T>>>,
}

impl<T> Clone for SharedPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SharedPool<T> {
    #[must_use]
    pub fn new(config: PoolConfig, factory: impl Fn() -> T + Send + 'static) -> Self {
        Self::from_pool(ObjectPool::new(config, factory))
    }

    #[must_use]
    pub fn from_pool(pool: ObjectPool<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    pub fn acquire(&self) -> T {
        self.inner.lock().acquire()
    }

    pub fn release(&self, obj: T) {
        self.inner.lock().release(obj);
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }

    /// Run `f` with the lock held.
    pub fn with<R>(&self, f: impl FnOnce(&mut ObjectPool<T>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Acquire an object released to this pool when the guard drops. The
    /// lock is not held while the guard lives.
    pub fn borrow(&self) -> SharedPooled<T> {
        SharedPooled {
            obj: Some(self.acquire()),
            pool: self.clone(),
        }
    }
}

/// Scoped loan from a [`SharedPool`].
pub struct SharedPooled<T> {
    pool: SharedPool<T>,
    obj: Option<T>,
}

impl<T> Deref for SharedPooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.obj.as_ref().unwrap_or_else(|| unreachable!("pooled object taken"))
    }
}

impl<T> DerefMut for SharedPooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.obj.as_mut().unwrap_or_else(|| unreachable!("pooled object taken"))
    }
}

impl<T> Drop for SharedPooled<T> {
    fn drop(&mut self) {
        if let Some(obj) = self.obj.take() {
            self.pool.release(obj);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_size: usize, initial_size: usize, min_size: usize) -> PoolConfig {
        PoolConfig {
            max_size,
            initial_size,
            min_size,
        }
    }

    fn vec_pool(cfg: PoolConfig) -> ObjectPool<Vec<u8>> {
        ObjectPool::new(cfg, Vec::new).with_reset(Vec::clear)
    }

    #[test]
    fn test_new_prewarms_initial_size() {
        let pool = vec_pool(config(4, 2, 0));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.stats().allocated, 2);
    }

    #[test]
    fn test_initial_size_capped_by_max() {
        let pool = vec_pool(config(3, 10, 0));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_acquire_hits_then_misses() {
        let mut pool = vec_pool(config(4, 1, 0));
        let a = pool.acquire();
        let b = pool.acquire();
        let stats = pool.stats();
        assert_eq!((stats.hits, stats.misses, stats.allocated), (1, 1, 2));
        assert_eq!(pool.in_use(), 2);
        pool.release_many([a, b]);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_release_never_exceeds_max_size() {
        let mut pool = vec_pool(config(2, 0, 0));
        let objs: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        pool.release_many(objs);
        assert_eq!(pool.len(), 2);
        pool.release(Vec::new());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_reset_runs_on_release() {
        let mut pool = vec_pool(config(2, 0, 0));
        let mut v = pool.acquire();
        v.extend_from_slice(b"dirty");
        pool.release(v);
        assert!(pool.acquire().is_empty());
    }

    #[test]
    fn test_prewarm_clear_and_shrink() {
        let mut pool = vec_pool(config(8, 0, 3));
        assert_eq!(pool.prewarm(20), 8);
        pool.clear();
        assert_eq!(pool.len(), 0);

        pool.prewarm(6);
        pool.shrink();
        assert_eq!(pool.len(), 3);

        pool.clear();
        pool.shrink();
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_hit_rate_arithmetic() {
        let mut pool = vec_pool(config(8, 3, 0));
        assert_eq!(pool.stats().hit_rate, 0.0);
        let objs: Vec<_> = (0..4).map(|_| pool.acquire()).collect();
        assert_eq!(pool.stats().hit_rate, 3.0 / 4.0);
        pool.release_many(objs);
    }

    #[test]
    fn test_borrow_guard_releases_on_drop() {
        let mut pool = vec_pool(config(2, 1, 0));
        {
            let mut guard = pool.borrow();
            guard.push(7);
            assert_eq!(guard.len(), 1);
        }
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.len(), 1);
        assert!(pool.acquire().is_empty());
    }

    #[test]
    fn test_borrow_guard_releases_on_panic() {
        let mut pool = vec_pool(config(2, 1, 0));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = pool.borrow();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_detach_keeps_object() {
        let mut pool = vec_pool(config(2, 1, 0));
        let mut kept = pool.borrow().detach();
        kept.push(1);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_optimize_grows_on_high_hit_rate_low_utilization() {
        let mut pool = vec_pool(config(8, 1, 0));
        for _ in 0..20 {
            let v = pool.acquire();
            pool.release(v);
        }
        assert_eq!(pool.optimize(), OptimizeOutcome::Grew { from: 8, to: 10 });
        assert_eq!(pool.max_size(), 10);
        assert_eq!(pool.stats().max_size, 10);
    }

    #[test]
    fn test_optimize_needs_samples_and_respects_limit() {
        let mut pool = vec_pool(config(1, 1, 0));
        assert_eq!(pool.optimize(), OptimizeOutcome::Unchanged);
        for _ in 0..20 {
            let v = pool.acquire();
            pool.release(v);
        }
        for _ in 0..10 {
            pool.optimize();
        }
        assert_eq!(pool.max_size(), 4);
    }

    #[test]
    fn test_optimize_skips_when_hit_rate_low() {
        let mut pool = vec_pool(config(64, 0, 0));
        let objs: Vec<_> = (0..20).map(|_| pool.acquire()).collect();
        assert_eq!(pool.optimize(), OptimizeOutcome::Unchanged);
        pool.release_many(objs);
    }

    #[test]
    fn test_shared_pool_guard() {
        let pool = SharedPool::new(config(4, 0, 0), || 0u32);
        {
            let mut guard = pool.borrow();
            *guard += 5;
        }
        let stats = pool.stats();
        assert_eq!(stats.pool_size, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(pool.with(|p| p.in_use()), 0);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let pool = vec_pool(PoolConfig::default());
        let json = serde_json::to_value(pool.stats()).unwrap();
        assert_eq!(json["poolSize"], 8);
        assert_eq!(json["maxSize"], 64);
        assert!(json.get("hitRate").is_some());
    }
}
