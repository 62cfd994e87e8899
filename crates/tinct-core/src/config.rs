//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::cache::CacheConfig;
use crate::error::ConfigError;
use crate::pool::PoolConfig;

/// Overrides `cache.max_size`.
const ENV_CACHE_SIZE: &str = "TINCT_CACHE_SIZE";
/// Overrides `cache.strategy` (`lru`, `lfu`, `fifo`).
const ENV_CACHE_STRATEGY: &str = "TINCT_CACHE_STRATEGY";
/// Overrides `pool.max_size`.
const ENV_POOL_SIZE: &str = "TINCT_POOL_SIZE";
/// Enables strict parsing when set to anything.
const ENV_STRICT: &str = "TINCT_STRICT";

/// Sizing and behavior for a [`ColorContext`](crate::context::ColorContext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default = "EngineConfig::builtin")]
pub struct EngineConfig {
    /// Applied to every scratch pool the context owns.
    pub pool: PoolConfig,
    /// Projection cache capacity and eviction policy.
    pub cache: CacheConfig,
    /// Reject out-of-range components instead of clamping them.
    pub strict: bool,
}

impl Default for EngineConfig {
    /// Built-in defaults, overridden by any `TINCT_*` environment variables.
    /// Unparseable values are ignored.
    fn default() -> Self {
        Self::builtin().with_overrides(|name| std::env::var(name).ok())
    }
}

impl EngineConfig {
    /// Defaults without consulting the environment.
    pub fn builtin() -> Self {
        Self {
            pool: PoolConfig::default(),
            cache: CacheConfig::default(),
            strict: false,
        }
    }

    /// Parse a JSON document. Missing fields take the built-in defaults;
    /// the environment is not consulted.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(size) = lookup(ENV_CACHE_SIZE).and_then(|s| s.trim().parse().ok()) {
            self.cache.max_size = size;
        }
        if let Some(strategy) = lookup(ENV_CACHE_STRATEGY).and_then(|s| s.parse().ok()) {
            self.cache.strategy = strategy;
        }
        if let Some(size) = lookup(ENV_POOL_SIZE).and_then(|s| s.trim().parse().ok()) {
            self.pool.max_size = size;
        }
        if lookup(ENV_STRICT).is_some() {
            self.strict = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::cache::EvictionStrategy;

    fn overridden(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::builtin().with_overrides(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_builtin_defaults() {
        let config = EngineConfig::builtin();
        assert_eq!(config.cache.max_size, 512);
        assert_eq!(config.cache.strategy, EvictionStrategy::Lru);
        assert_eq!(config.pool.max_size, 64);
        assert_eq!(config.pool.initial_size, 8);
        assert_eq!(config.pool.min_size, 0);
        assert!(!config.strict);
    }

    #[test]
    fn test_env_overrides() {
        let config = overridden(&[
            ("TINCT_CACHE_SIZE", "128"),
            ("TINCT_CACHE_STRATEGY", "FIFO"),
            ("TINCT_POOL_SIZE", " 16 "),
            ("TINCT_STRICT", ""),
        ]);
        assert_eq!(config.cache.max_size, 128);
        assert_eq!(config.cache.strategy, EvictionStrategy::Fifo);
        assert_eq!(config.pool.max_size, 16);
        assert!(config.strict);
    }

    #[test]
    fn test_unparseable_env_falls_back() {
        let config = overridden(&[("TINCT_CACHE_SIZE", "lots"), ("TINCT_CACHE_STRATEGY", "random")]);
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn test_from_json_partial_document() {
        let config =
            EngineConfig::from_json(r#"{"strict": true, "cache": {"max_size": 9}, "pool": {"max_size": 4}}"#)
                .unwrap();
        assert!(config.strict);
        assert_eq!(config.cache.max_size, 9);
        assert_eq!(config.cache.strategy, EvictionStrategy::Lru);
        assert_eq!(config.pool.max_size, 4);
        assert_eq!(config.pool.initial_size, 8);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(EngineConfig::from_json("[1, 2").is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = overridden(&[("TINCT_CACHE_STRATEGY", "lfu")]);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }
}
