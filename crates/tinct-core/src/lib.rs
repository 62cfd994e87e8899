//! Tinct Core, the color value engine behind the design-token toolkit.
//!
//! This crate contains the numeric color conversions, perceptual metrics,
//! and the object pool and cache that keep bulk conversion cheap. Palette
//! curves, gradients, and theme plumbing live elsewhere and only consume
//! the API exported here.

pub mod cache;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod value;

// Re-exports for convenience.
pub use cache::{Cache, CacheConfig, CacheStats, EvictionStrategy, SharedCache};
pub use config::EngineConfig;
pub use context::{ColorContext, ContextStats, ProjectionKey};
pub use convert::spaces::{Cmyk, Hsl, Hsv, Hwb, Lab, Lch, Oklab, Oklch, Rgb, Xyz};
pub use convert::{ColorSpace, Projection};
pub use error::{ParseError, ParseErrorKind, RangeWarning};
pub use metrics::{TextSize, WcagLevel};
pub use pool::{ObjectPool, PoolConfig, PoolStats, SharedPool};
pub use value::{ColorInput, ColorValue, MixSpace};
