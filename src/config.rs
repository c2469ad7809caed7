//! Configuration Module
//!
//! Engine options (`LoaderConfig`) and demo server settings (`ServerConfig`),
//! both loadable from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::error::{LoadError, Result};

/// Derives the cache/dedupe identity of a key (e.g. case folding).
pub type CacheKeyFn<K> = Arc<dyn Fn(&K) -> K + Send + Sync>;

/// Produces the future a batch waits on before it is flushed.
pub type ScheduleFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

// == Batch Schedule ==
/// When a collecting batch is flushed.
#[derive(Clone, Default)]
pub enum BatchSchedule {
    /// Flush once the caller suspends on any handle of the batch
    #[default]
    YieldPoint,
    /// Flush a fixed time after the batch is created
    Window(Duration),
    /// Flush when the supplied future completes
    Custom(ScheduleFn),
}

impl fmt::Debug for BatchSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchSchedule::YieldPoint => f.write_str("YieldPoint"),
            BatchSchedule::Window(window) => f.debug_tuple("Window").field(window).finish(),
            BatchSchedule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// == Loader Config ==
/// Options recognized by every scope a `ScopeManager` creates.
pub struct LoaderConfig<K> {
    /// Unique keys per batch before an early flush, None = unbounded
    pub max_batch_size: Option<usize>,
    /// Flush deferral strategy
    pub batch_schedule: BatchSchedule,
    /// Cache key normalization, None = the key itself
    pub cache_key_fn: Option<CacheKeyFn<K>>,
    /// When false, every load enters a batch
    pub cache_enabled: bool,
    /// TTL for cache writes that do not specify one
    pub default_ttl: Option<Duration>,
    /// Deadline for one collaborator call
    pub batch_timeout: Option<Duration>,
    /// Use one cache region for all scopes instead of one per scope
    pub shared_cache: bool,
}

impl<K> Default for LoaderConfig<K> {
    fn default() -> Self {
        Self {
            max_batch_size: None,
            batch_schedule: BatchSchedule::YieldPoint,
            cache_key_fn: None,
            cache_enabled: true,
            default_ttl: None,
            batch_timeout: None,
            shared_cache: false,
        }
    }
}

impl<K> Clone for LoaderConfig<K> {
    fn clone(&self) -> Self {
        Self {
            max_batch_size: self.max_batch_size,
            batch_schedule: self.batch_schedule.clone(),
            cache_key_fn: self.cache_key_fn.clone(),
            cache_enabled: self.cache_enabled,
            default_ttl: self.default_ttl,
            batch_timeout: self.batch_timeout,
            shared_cache: self.shared_cache,
        }
    }
}

impl<K> fmt::Debug for LoaderConfig<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderConfig")
            .field("max_batch_size", &self.max_batch_size)
            .field("batch_schedule", &self.batch_schedule)
            .field("cache_key_fn", &self.cache_key_fn.as_ref().map(|_| ".."))
            .field("cache_enabled", &self.cache_enabled)
            .field("default_ttl", &self.default_ttl)
            .field("batch_timeout", &self.batch_timeout)
            .field("shared_cache", &self.shared_cache)
            .finish()
    }
}

impl<K> LoaderConfig<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = Some(max);
        self
    }

    pub fn with_batch_schedule(mut self, schedule: BatchSchedule) -> Self {
        self.batch_schedule = schedule;
        self
    }

    pub fn with_cache_key_fn(mut self, f: impl Fn(&K) -> K + Send + Sync + 'static) -> Self {
        self.cache_key_fn = Some(Arc::new(f));
        self
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = Some(timeout);
        self
    }

    pub fn with_shared_cache(mut self, shared: bool) -> Self {
        self.shared_cache = shared;
        self
    }

    // == Validate ==
    /// Rejects option combinations the engine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == Some(0) {
            return Err(LoadError::Configuration(
                "max_batch_size must be at least 1".to_string(),
            ));
        }
        if self.default_ttl == Some(Duration::ZERO) {
            return Err(LoadError::Configuration(
                "default_ttl must be positive".to_string(),
            ));
        }
        if self.batch_timeout == Some(Duration::ZERO) {
            return Err(LoadError::Configuration(
                "batch_timeout must be positive".to_string(),
            ));
        }
        if let BatchSchedule::Window(window) = self.batch_schedule {
            if window.is_zero() {
                return Err(LoadError::Configuration(
                    "batch window must be positive".to_string(),
                ));
            }
        }
        if self.shared_cache && !self.cache_enabled {
            return Err(LoadError::Configuration(
                "shared_cache requires cache_enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies the cache key function, if any.
    pub fn cache_key(&self, key: &K) -> K
    where
        K: Clone,
    {
        match &self.cache_key_fn {
            Some(f) => f(key),
            None => key.clone(),
        }
    }

    // == From Env ==
    /// Loads options from environment variables and validates them.
    ///
    /// # Environment Variables
    /// - `LOADER_MAX_BATCH_SIZE` - Unique keys per batch (default: unbounded)
    /// - `LOADER_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: none)
    /// - `LOADER_BATCH_TIMEOUT_MS` - Collaborator deadline in milliseconds (default: none)
    /// - `LOADER_BATCH_WINDOW_MS` - Fixed flush window instead of yield-point deferral
    /// - `LOADER_CACHE_ENABLED` - `true`/`false` (default: true)
    /// - `LOADER_SHARED_CACHE` - `true`/`false` (default: false)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        config.max_batch_size = parse_var(&lookup, "LOADER_MAX_BATCH_SIZE")?;
        config.default_ttl = parse_millis(&lookup, "LOADER_DEFAULT_TTL_MS")?;
        config.batch_timeout = parse_millis(&lookup, "LOADER_BATCH_TIMEOUT_MS")?;
        if let Some(window) = parse_millis(&lookup, "LOADER_BATCH_WINDOW_MS")? {
            config.batch_schedule = BatchSchedule::Window(window);
        }
        if let Some(enabled) = parse_var(&lookup, "LOADER_CACHE_ENABLED")? {
            config.cache_enabled = enabled;
        }
        if let Some(shared) = parse_var(&lookup, "LOADER_SHARED_CACHE")? {
            config.shared_cache = shared;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| LoadError::Configuration(format!("{} has invalid value '{}'", name, raw))),
    }
}

/// Parses a signed millisecond count so that negative durations are reported
/// rather than wrapped or silently defaulted.
fn parse_millis(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<Duration>> {
    match parse_var::<i64>(lookup, name)? {
        None => Ok(None),
        Some(ms) if ms < 0 => Err(LoadError::Configuration(format!(
            "{} must not be negative, got {}",
            name, ms
        ))),
        Some(ms) => Ok(Some(Duration::from_millis(ms as u64))),
    }
}

// == Server Config ==
/// Demo server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP server port
    pub server_port: u16,
    /// Shared-cache cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Number of users seeded into the demo directory
    pub directory_size: u64,
    /// Simulated latency of one directory bulk call in milliseconds
    pub directory_latency_ms: u64,
}

impl ServerConfig {
    /// Creates a new ServerConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 30)
    /// - `DIRECTORY_SIZE` - Seeded users (default: 1000)
    /// - `DIRECTORY_LATENCY_MS` - Simulated bulk call latency (default: 25)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            directory_size: env_or("DIRECTORY_SIZE", defaults.directory_size),
            directory_latency_ms: env_or("DIRECTORY_LATENCY_MS", defaults.directory_latency_ms),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: 30,
            directory_size: 1000,
            directory_latency_ms: 25,
        }
    }
}
