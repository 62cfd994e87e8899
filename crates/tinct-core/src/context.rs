//! Per-thread bundle of scratch pools and the projection cache.
//!
//! A [`ColorContext`] is the mutable half of the engine. The conversion and
//! metric functions are pure and need none of this; a context only adds
//! memoization across colors and pooled scratch space for bulk work. Build
//! one per worker thread, or share pieces through
//! [`SharedPool`](crate::pool::SharedPool) / [`SharedCache`](crate::cache::SharedCache).
//!
//! A thread-local default exists for convenience, but nothing creates it
//! implicitly: call [`install_thread_default`] first.

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::{Cache, CacheStats};
use crate::config::EngineConfig;
use crate::convert::rgb::{hsl_to_unit, hsv_to_unit};
use crate::convert::spaces::{Hsl, Hsv, Rgb};
use crate::convert::{self, ColorSpace, Projection};
use crate::error::{ParseError, SnapshotError};
use crate::pool::{ObjectPool, PoolStats};
use crate::value::{ColorInput, ColorValue};

/// Cache key for a projection: packed `0xRRGGBB` and the target space.
///
/// Serialized as `"rrggbb:space"`, e.g. `"1890ff:oklch"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectionKey {
    pub rgb: u32,
    pub space: ColorSpace,
}

/// A string that is not `rrggbb:space`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid projection key `{0}` (expected rrggbb:space)")]
pub struct InvalidProjectionKey(pub String);

impl fmt::Display for ProjectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}:{}", self.rgb & 0x00FF_FFFF, self.space)
    }
}

impl FromStr for ProjectionKey {
    type Err = InvalidProjectionKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidProjectionKey(s.to_string());
        let (hex, space) = s.split_once(':').ok_or_else(invalid)?;
        if hex.len() != 6 {
            return Err(invalid());
        }
        let rgb = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        let space = space.parse().map_err(|_| invalid())?;
        Ok(Self { rgb, space })
    }
}

impl TryFrom<String> for ProjectionKey {
    type Error = InvalidProjectionKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProjectionKey> for String {
    fn from(value: ProjectionKey) -> Self {
        value.to_string()
    }
}

/// Counters for everything a context owns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextStats {
    pub cache: CacheStats,
    pub rgb_pool: PoolStats,
    pub hsl_pool: PoolStats,
    pub hsv_pool: PoolStats,
    pub batch_pool: PoolStats,
}

/// Scratch pools plus a projection cache, owned by one thread or worker.
#[derive(Debug)]
pub struct ColorContext {
    config: EngineConfig,
    rgb_pool: ObjectPool<Rgb>,
    hsl_pool: ObjectPool<Hsl>,
    hsv_pool: ObjectPool<Hsv>,
    batch_pool: ObjectPool<Vec<Rgb>>,
    projections: Cache<ProjectionKey, Projection>,
}

impl Default for ColorContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn project_cached(
    cache: &mut Cache<ProjectionKey, Projection>,
    rgb: Rgb,
    space: ColorSpace,
) -> Projection {
    // RGB carries alpha, which the key does not; it is free to compute anyway.
    if space == ColorSpace::Rgb {
        return Projection::Rgb(rgb);
    }
    let key = ProjectionKey {
        rgb: rgb.to_u24(),
        space,
    };
    *cache.get_or_insert_with(key, || convert::project(rgb, space))
}

impl ColorContext {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        tracing::debug!(
            cache_size = config.cache.max_size,
            strategy = %config.cache.strategy,
            pool_size = config.pool.max_size,
            strict = config.strict,
            "color context created"
        );
        Self {
            config,
            rgb_pool: ObjectPool::new(config.pool, Rgb::default),
            hsl_pool: ObjectPool::new(config.pool, Hsl::default),
            hsv_pool: ObjectPool::new(config.pool, Hsv::default),
            batch_pool: ObjectPool::new(config.pool, Vec::new).with_reset(Vec::clear),
            projections: Cache::new(config.cache),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse with this context's strictness.
    pub fn parse<'a>(&self, input: impl Into<ColorInput<'a>>) -> Result<ColorValue, ParseError> {
        ColorValue::parse_with(input, self.config.strict)
    }

    /// Project `color` into `space`, memoized across every color this
    /// context has seen.
    pub fn project(&mut self, color: &ColorValue, space: ColorSpace) -> Projection {
        project_cached(&mut self.projections, color.to_rgb(), space)
    }

    /// Project a slice of colors, staging their canonical channels in a
    /// pooled buffer.
    pub fn project_many(&mut self, colors: &[ColorValue], space: ColorSpace) -> Vec<Projection> {
        let Self {
            batch_pool,
            projections,
            ..
        } = self;
        let mut scratch = batch_pool.borrow();
        scratch.extend(colors.iter().map(ColorValue::to_rgb));
        scratch
            .iter()
            .map(|&rgb| project_cached(projections, rgb, space))
            .collect()
    }

    /// Edit the canonical channels in a pooled scratch record.
    pub fn adjust_rgb(&mut self, color: &ColorValue, f: impl FnOnce(&mut Rgb)) -> ColorValue {
        let mut scratch = self.rgb_pool.borrow();
        *scratch = color.to_rgb();
        f(&mut *scratch);
        ColorValue::new(*scratch)
    }

    /// Edit the HSL projection in a pooled scratch record. Alpha is kept.
    pub fn adjust_hsl(&mut self, color: &ColorValue, f: impl FnOnce(&mut Hsl)) -> ColorValue {
        let mut scratch = self.hsl_pool.borrow();
        *scratch = color.to_hsl();
        f(&mut *scratch);
        ColorValue::new(Rgb::from_unit(hsl_to_unit(*scratch), color.alpha()))
    }

    /// Edit the HSV projection in a pooled scratch record. Alpha is kept.
    pub fn adjust_hsv(&mut self, color: &ColorValue, f: impl FnOnce(&mut Hsv)) -> ColorValue {
        let mut scratch = self.hsv_pool.borrow();
        *scratch = color.to_hsv();
        f(&mut *scratch);
        ColorValue::new(Rgb::from_unit(hsv_to_unit(*scratch), color.alpha()))
    }

    /// Let every pool apply its growth heuristic.
    pub fn optimize_pools(&mut self) {
        self.rgb_pool.optimize();
        self.hsl_pool.optimize();
        self.hsv_pool.optimize();
        self.batch_pool.optimize();
    }

    pub fn clear_cache(&mut self) {
        self.projections.clear();
    }

    /// The projection cache as a `{key, value}` JSON array.
    pub fn cache_snapshot_json(&self) -> Result<String, SnapshotError> {
        self.projections.snapshot_json()
    }

    /// Replace the projection cache from [`cache_snapshot_json`](Self::cache_snapshot_json) output.
    pub fn restore_cache_json(&mut self, json: &str) -> Result<usize, SnapshotError> {
        self.projections.restore_json(json)
    }

    #[must_use]
    pub fn stats(&self) -> ContextStats {
        ContextStats {
            cache: self.projections.stats(),
            rgb_pool: self.rgb_pool.stats(),
            hsl_pool: self.hsl_pool.stats(),
            hsv_pool: self.hsv_pool.stats(),
            batch_pool: self.batch_pool.stats(),
        }
    }
}

thread_local! {
    static THREAD_DEFAULT: RefCell<Option<ColorContext>> = const { RefCell::new(None) };
}

/// Install `context` as this thread's default, returning the one it replaces.
pub fn install_thread_default(context: ColorContext) -> Option<ColorContext> {
    THREAD_DEFAULT.with(|slot| {
        let previous = slot.borrow_mut().replace(context);
        if previous.is_some() {
            tracing::warn!("replaced an installed thread-default color context");
        }
        previous
    })
}

/// Run `f` against this thread's default context. Returns `None` when no
/// default is installed, or when called re-entrantly from inside `f`.
pub fn with_thread_default<R>(f: impl FnOnce(&mut ColorContext) -> R) -> Option<R> {
    THREAD_DEFAULT.with(|slot| {
        let mut guard = slot.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

/// Remove and return this thread's default context.
pub fn take_thread_default() -> Option<ColorContext> {
    THREAD_DEFAULT.with(|slot| slot.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EvictionStrategy;
    use crate::pool::PoolConfig;

    fn context() -> ColorContext {
        ColorContext::new(EngineConfig::builtin())
    }

    #[test]
    fn test_projection_key_string_form() {
        let key = ProjectionKey {
            rgb: 0x1890ff,
            space: ColorSpace::Oklch,
        };
        assert_eq!(key.to_string(), "1890ff:oklch");
        assert_eq!("1890FF:OKLCH".parse::<ProjectionKey>().unwrap(), key);
        assert!("1890ff".parse::<ProjectionKey>().is_err());
        assert!("1890f:lab".parse::<ProjectionKey>().is_err());
        assert!("1890ff:yuv".parse::<ProjectionKey>().is_err());
    }

    #[test]
    fn test_project_is_memoized_across_instances() {
        let mut ctx = context();
        let a = ColorValue::parse("#1890ff").unwrap();
        let b = ColorValue::parse("rgb(24, 144, 255)").unwrap();
        let first = ctx.project(&a, ColorSpace::Lab);
        let second = ctx.project(&b, ColorSpace::Lab);
        assert_eq!(first, second);
        assert_eq!(first, Projection::Lab(a.to_lab()));
        let stats = ctx.stats().cache;
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
    }

    #[test]
    fn test_rgb_projection_bypasses_cache_and_keeps_alpha() {
        let mut ctx = context();
        let c = ColorValue::from_rgba(1, 2, 3, 0.5);
        assert_eq!(ctx.project(&c, ColorSpace::Rgb), Projection::Rgb(c.to_rgb()));
        assert_eq!(ctx.stats().cache.size, 0);
    }

    #[test]
    fn test_project_many_returns_buffer_to_pool() {
        let mut ctx = context();
        let colors: Vec<ColorValue> = ["red", "lime", "red", "blue"]
            .into_iter()
            .map(|s| ColorValue::parse(s).unwrap())
            .collect();
        let out = ctx.project_many(&colors, ColorSpace::Hsl);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], out[2]);
        let stats = ctx.stats();
        assert_eq!(stats.cache.size, 3);
        assert_eq!(stats.batch_pool.hits, 1);
        assert_eq!(stats.batch_pool.pool_size, EngineConfig::builtin().pool.initial_size);
    }

    #[test]
    fn test_adjustments_use_pooled_scratch() {
        let mut ctx = context();
        let red = ColorValue::parse("red").unwrap();
        let green = ctx.adjust_hsl(&red, |hsl| hsl.h += 120.0);
        assert_eq!(green, ColorValue::parse("lime").unwrap());
        let dim = ctx.adjust_hsv(&red, |hsv| hsv.v = 50.0);
        assert_eq!(dim, ColorValue::from_rgb(128, 0, 0));
        let swapped = ctx.adjust_rgb(&red, |rgb| std::mem::swap(&mut rgb.r, &mut rgb.b));
        assert_eq!(swapped, ColorValue::parse("blue").unwrap());

        let stats = ctx.stats();
        for pool in [stats.rgb_pool, stats.hsl_pool, stats.hsv_pool] {
            assert_eq!((pool.hits, pool.misses), (1, 0));
        }
    }

    #[test]
    fn test_strict_context_rejects_out_of_range() {
        let strict = ColorContext::new(EngineConfig {
            strict: true,
            ..EngineConfig::builtin()
        });
        assert!(strict.parse("rgb(300, 0, 0)").is_err());
        assert!(context().parse("rgb(300, 0, 0)").is_ok());
    }

    #[test]
    fn test_cache_snapshot_roundtrip() {
        let mut ctx = ColorContext::new(EngineConfig {
            cache: crate::cache::CacheConfig {
                max_size: 8,
                strategy: EvictionStrategy::Fifo,
            },
            pool: PoolConfig::default(),
            strict: false,
        });
        let c = ColorValue::parse("#ff0000").unwrap();
        ctx.project(&c, ColorSpace::Cmyk);
        let json = ctx.cache_snapshot_json().unwrap();
        assert!(json.starts_with(r#"[{"key":"ff0000:cmyk","value":{"space":"cmyk""#));

        let mut other = context();
        assert_eq!(other.restore_cache_json(&json).unwrap(), 1);
        assert_eq!(other.project(&c, ColorSpace::Cmyk), ctx.project(&c, ColorSpace::Cmyk));
        assert_eq!(other.stats().cache.hits, 1);
    }

    #[test]
    fn test_thread_default_lifecycle() {
        assert!(with_thread_default(|_| ()).is_none());
        assert!(install_thread_default(context()).is_none());

        let red = ColorValue::parse("red").unwrap();
        let projected = with_thread_default(|ctx| ctx.project(&red, ColorSpace::Hsv));
        assert!(matches!(projected, Some(Projection::Hsv(_))));

        let nested = with_thread_default(|_| with_thread_default(|_| ()));
        assert_eq!(nested, Some(None));

        assert!(install_thread_default(context()).is_some());
        assert!(take_thread_default().is_some());
        assert!(take_thread_default().is_none());
    }

    #[test]
    fn test_thread_defaults_are_per_thread() {
        install_thread_default(context());
        let seen = std::thread::spawn(|| with_thread_default(|_| ()).is_some())
            .join()
            .unwrap();
        assert!(!seen);
        take_thread_default();
    }
}
