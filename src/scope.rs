//! Scope Management Module
//!
//! A scope is the unit of isolation: every scope owns its own batches and,
//! unless a shared cache region is configured, its own result cache and
//! dependency graph. One scope per incoming request is the intended usage.

use std::fmt;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{CacheStats, ResultCache, SharedCache};
use crate::config::LoaderConfig;
use crate::error::Result;
use crate::fetch::BatchFn;
use crate::lock::mutex_lock;
use crate::scheduler::Loader;

// == Scope Id ==
/// Identifier of a scope. Ids are never reused within one manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ScopeId(u64);

impl ScopeId {
    /// The cache region shared across scopes.
    pub const SHARED: ScopeId = ScopeId(0);

    pub const fn from_raw(raw: u64) -> Self {
        ScopeId(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == ScopeId::SHARED {
            write!(f, "shared")
        } else {
            write!(f, "scope-{}", self.0)
        }
    }
}

// == Engine Metrics ==
/// Engine-wide counters, updated lock-free from every scope.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    scopes_created: AtomicU64,
    scopes_destroyed: AtomicU64,
    scopes_released: AtomicU64,
    batches_dispatched: AtomicU64,
    keys_fetched: AtomicU64,
    cache_hits: AtomicU64,
    waiters_rejected: AtomicU64,
}

/// Point-in-time copy of [`EngineMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub scopes_created: u64,
    pub scopes_destroyed: u64,
    /// Scopes whose engine state is still alive
    pub scopes_active: u64,
    pub batches_dispatched: u64,
    /// Unique keys sent to the collaborator across all batches
    pub keys_fetched: u64,
    pub cache_hits: u64,
    /// Loads rejected because their scope was destroyed
    pub waiters_rejected: u64,
}

impl EngineMetrics {
    pub(crate) fn record_scope_created(&self) {
        self.scopes_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_scope_destroyed(&self, rejected: usize) {
        self.scopes_destroyed.fetch_add(1, Ordering::Relaxed);
        self.waiters_rejected.fetch_add(rejected as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_scope_released(&self) {
        self.scopes_released.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_batch(&self, keys: usize) {
        self.batches_dispatched.fetch_add(1, Ordering::Relaxed);
        self.keys_fetched.fetch_add(keys as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineStats {
        let created = self.scopes_created.load(Ordering::Relaxed);
        let released = self.scopes_released.load(Ordering::Relaxed);
        EngineStats {
            scopes_created: created,
            scopes_destroyed: self.scopes_destroyed.load(Ordering::Relaxed),
            scopes_active: created.saturating_sub(released),
            batches_dispatched: self.batches_dispatched.load(Ordering::Relaxed),
            keys_fetched: self.keys_fetched.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            waiters_rejected: self.waiters_rejected.load(Ordering::Relaxed),
        }
    }
}

// == Scope Manager ==
/// Creates and destroys scopes bound to one backing-store collaborator.
pub struct ScopeManager<K, V> {
    fetcher: Arc<dyn BatchFn<K, V>>,
    config: LoaderConfig<K>,
    /// Present only when scopes share one cache region
    shared_cache: Option<SharedCache<K, V>>,
    next_id: AtomicU64,
    metrics: Arc<EngineMetrics>,
}

impl<K, V> ScopeManager<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Validates `config` and builds a manager around `fetcher`.
    pub fn new(fetcher: impl BatchFn<K, V> + 'static, config: LoaderConfig<K>) -> Result<Self> {
        Self::from_arc(Arc::new(fetcher), config)
    }

    /// Like [`new`](Self::new) for a collaborator that is already shared.
    pub fn from_arc(fetcher: Arc<dyn BatchFn<K, V>>, config: LoaderConfig<K>) -> Result<Self> {
        config.validate()?;
        let shared_cache = config
            .shared_cache
            .then(|| Arc::new(Mutex::new(ResultCache::new())));
        info!(
            shared_cache = config.shared_cache,
            cache_enabled = config.cache_enabled,
            max_batch_size = ?config.max_batch_size,
            schedule = ?config.batch_schedule,
            "Scope manager initialized"
        );
        Ok(Self {
            fetcher,
            config,
            shared_cache,
            next_id: AtomicU64::new(1),
            metrics: Arc::new(EngineMetrics::default()),
        })
    }

    /// Opens a fresh scope with its own batches and (unless shared) cache.
    pub fn create_scope(&self) -> Loader<K, V> {
        let scope_id = ScopeId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (cache, shared_region) = match &self.shared_cache {
            Some(shared) => (Arc::clone(shared), true),
            None => (Arc::new(Mutex::new(ResultCache::new())), false),
        };
        self.metrics.record_scope_created();
        debug!(scope = %scope_id, shared_region, "Scope created");

        Loader::new(
            scope_id,
            self.config.clone(),
            Arc::clone(&self.fetcher),
            cache,
            shared_region,
            Arc::clone(&self.metrics),
        )
    }

    /// Closes `loader`'s scope: every pending load is rejected with
    /// `ScopeClosed` and the scope's cache state is dropped. Entries in a
    /// shared region stay.
    ///
    /// Returns the number of loads rejected. Destroying twice is a no-op.
    pub fn destroy_scope(&self, loader: &Loader<K, V>) -> usize {
        let Some(rejected) = loader.close() else {
            return 0;
        };
        self.metrics.record_scope_destroyed(rejected);
        debug!(scope = %loader.scope_id(), rejected, "Scope destroyed");
        rejected
    }

    /// Runs `f` inside a fresh scope and destroys the scope afterwards.
    pub async fn with_scope<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce(Loader<K, V>) -> Fut,
        Fut: Future<Output = T>,
    {
        let loader = self.create_scope();
        let output = f(loader.clone()).await;
        self.destroy_scope(&loader);
        output
    }

    /// The shared cache region, when configured.
    pub fn shared_cache(&self) -> Option<SharedCache<K, V>> {
        self.shared_cache.clone()
    }

    pub fn shared_cache_stats(&self) -> Option<CacheStats> {
        self.shared_cache
            .as_ref()
            .map(|cache| mutex_lock(cache, "scope", "shared_cache_stats").stats())
    }

    pub fn stats(&self) -> EngineStats {
        self.metrics.snapshot()
    }

    pub fn config(&self) -> &LoaderConfig<K> {
        &self.config
    }
}

impl<K, V> fmt::Debug for ScopeManager<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeManager")
            .field("shared_cache", &self.shared_cache.is_some())
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}
