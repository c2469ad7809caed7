//! Batch Scheduler Module
//!
//! Collects the loads issued by one scope into batches and dispatches each
//! batch to the backing store in a single call.
//!
//! A batch is `Collecting` from its first uncached load until it is flushed.
//! Under the default [`BatchSchedule::YieldPoint`] deferral the flush starts
//! when the caller first polls any handle of the batch, which is exactly the
//! point where the caller hands control back to the runtime. Every `load`
//! issued before that point lands in the same batch.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures::future::{self, BoxFuture, JoinAll};
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheWrite, SharedCache};
use crate::config::{BatchSchedule, LoaderConfig};
use crate::dedupe::{fan_out, KeyDeduplicator};
use crate::error::{LoadError, Result};
use crate::fetch::{BatchFn, KeyOutcome};
use crate::lock::mutex_lock;
use crate::scope::{EngineMetrics, ScopeId};

const SOURCE: &str = "scheduler";

pub(crate) type BatchId = u64;

// == Batch State ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BatchState {
    /// Accepting waiters
    Collecting,
    /// Collaborator call in progress; no new keys
    Flushing,
    /// Waiters resolved
    Done,
}

// == Load Request ==
/// One pending `load` call.
struct LoadRequest<K, V> {
    /// Key as passed by the caller
    key: K,
    /// Normalized key used for caching and deduplication
    cache_key: K,
    responder: oneshot::Sender<Result<V>>,
    scope_id: ScopeId,
    enqueued_at: Instant,
}

impl<K, V> LoadRequest<K, V> {
    fn new(scope_id: ScopeId, key: K, cache_key: K) -> (Self, oneshot::Receiver<Result<V>>) {
        let (responder, receiver) = oneshot::channel();
        let request = Self {
            key,
            cache_key,
            responder,
            scope_id,
            enqueued_at: Instant::now(),
        };
        (request, receiver)
    }

    fn resolve(self, outcome: Result<V>) {
        // The caller may have dropped its handle
        let _ = self.responder.send(outcome);
    }
}

// == Batch ==
struct Batch<K, V> {
    id: BatchId,
    state: BatchState,
    /// Waiters in load order; FIFO per key follows from this
    waiters: Vec<LoadRequest<K, V>>,
    /// Normalized keys present in this batch
    keys: HashSet<K>,
    /// An undelayed flush task has been spawned or the batch is flushing
    triggered: bool,
    /// A flush task waiting on the window or custom schedule is pending
    scheduled: bool,
    /// Cache generation when the collaborator call was dispatched
    dispatched_at: Option<u64>,
    created_at: Instant,
    /// Completion signal of the batch created before this one
    previous: Option<oneshot::Receiver<()>>,
    /// Completion signal for the batch created after this one
    done: Option<oneshot::Sender<()>>,
}

impl<K, V> Batch<K, V>
where
    K: Eq + Hash,
{
    /// A batch dispatched before the latest invalidation is stale and takes
    /// no new waiters.
    fn joinable(&self, cache_key: &K, generation: u64) -> bool {
        self.state != BatchState::Done
            && !matches!(self.dispatched_at, Some(at) if at != generation)
            && self.keys.contains(cache_key)
    }
}

struct SchedulerState<K, V> {
    closed: bool,
    next_batch_id: BatchId,
    /// The batch currently accepting new keys
    open: Option<Batch<K, V>>,
    /// Sealed or flushing batches, by creation order
    queued: BTreeMap<BatchId, Batch<K, V>>,
    /// Completion signal of the most recently created batch
    last_done: Option<oneshot::Receiver<()>>,
    batches_dispatched: u64,
}

impl<K, V> SchedulerState<K, V>
where
    K: Eq + Hash,
{
    fn batch_mut(&mut self, id: BatchId) -> Option<&mut Batch<K, V>> {
        if self.open.as_ref().is_some_and(|b| b.id == id) {
            return self.open.as_mut();
        }
        self.queued.get_mut(&id)
    }

    fn pending_batch_mut(&mut self, cache_key: &K, generation: u64) -> Option<&mut Batch<K, V>> {
        if self.open.as_ref().is_some_and(|b| b.joinable(cache_key, generation)) {
            return self.open.as_mut();
        }
        self.queued
            .values_mut()
            .find(|b| b.joinable(cache_key, generation))
    }

    fn pending_waiters(&self) -> usize {
        self.open.iter().chain(self.queued.values()).map(|b| b.waiters.len()).sum()
    }
}

/// Wakes the scheduler owning a batch when one of its handles is polled.
trait FlushTrigger: Send + Sync {
    fn trigger(self: Arc<Self>, batch: BatchId);
}

// == Scheduler ==
pub(crate) struct Scheduler<K, V> {
    scope_id: ScopeId,
    /// Scope under which results are cached ([`ScopeId::SHARED`] for a shared region)
    cache_scope: ScopeId,
    config: LoaderConfig<K>,
    fetcher: Arc<dyn BatchFn<K, V>>,
    cache: SharedCache<K, V>,
    metrics: Arc<EngineMetrics>,
    state: Mutex<SchedulerState<K, V>>,
}

impl<K, V> Scheduler<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn enqueue(self: &Arc<Self>, key: K) -> LoadHandle<V> {
        let cache_key = self.config.cache_key(&key);
        let mut state = mutex_lock(&self.state, SOURCE, "load");

        if state.closed {
            return LoadHandle::ready(Err(LoadError::ScopeClosed(self.scope_id)));
        }

        if self.config.cache_enabled {
            let (cached, generation) = {
                let mut cache = mutex_lock(&self.cache, SOURCE, "load.cache");
                (cache.get_value(self.cache_scope, &cache_key), cache.generation())
            };
            if let Some(value) = cached {
                self.metrics.record_cache_hit();
                return LoadHandle::ready(Ok(value));
            }

            // Coalesce with a sealed or in-flight batch that already carries the key
            if let Some(batch) = state.pending_batch_mut(&cache_key, generation) {
                let (request, receiver) = LoadRequest::new(self.scope_id, key, cache_key);
                batch.waiters.push(request);
                let trigger = (batch.state == BatchState::Collecting).then_some(batch.id);
                return self.pending_handle(receiver, trigger);
            }
        }

        let mut batch = match state.open.take() {
            Some(batch) => batch,
            None => self.new_batch(&mut state),
        };
        let batch_id = batch.id;
        batch.keys.insert(cache_key.clone());
        let (request, receiver) = LoadRequest::new(self.scope_id, key, cache_key);
        batch.waiters.push(request);

        if self.config.max_batch_size == Some(batch.keys.len()) {
            debug!(
                scope = %self.scope_id,
                batch = batch_id,
                keys = batch.keys.len(),
                "Batch reached max size, flushing early"
            );
            state.queued.insert(batch_id, batch);
            self.seal_and_spawn(&mut state, batch_id);
        } else {
            state.open = Some(batch);
        }

        self.pending_handle(receiver, Some(batch_id))
    }

    fn pending_handle(
        self: &Arc<Self>,
        receiver: oneshot::Receiver<Result<V>>,
        batch: Option<BatchId>,
    ) -> LoadHandle<V> {
        let trigger = batch.map(|id| (Arc::clone(self) as Arc<dyn FlushTrigger>, id));
        LoadHandle::pending(self.scope_id, receiver, trigger)
    }

    fn new_batch(self: &Arc<Self>, state: &mut SchedulerState<K, V>) -> Batch<K, V> {
        let id = state.next_batch_id;
        state.next_batch_id += 1;

        let (done_tx, done_rx) = oneshot::channel();
        let previous = state.last_done.replace(done_rx);
        let mut batch = Batch {
            id,
            state: BatchState::Collecting,
            waiters: Vec::new(),
            keys: HashSet::new(),
            triggered: false,
            scheduled: false,
            dispatched_at: None,
            created_at: Instant::now(),
            previous,
            done: Some(done_tx),
        };

        if !matches!(self.config.batch_schedule, BatchSchedule::YieldPoint) {
            batch.scheduled = self.spawn_flush(id, true);
        }

        debug!(scope = %self.scope_id, batch = id, "Batch created");
        batch
    }

    /// Marks a queued batch as triggered and spawns its flush without delay,
    /// even if a scheduled flush is still waiting.
    fn seal_and_spawn(self: &Arc<Self>, state: &mut SchedulerState<K, V>, id: BatchId) {
        let Some(batch) = state.queued.get_mut(&id) else {
            return;
        };
        if batch.state == BatchState::Collecting && !batch.triggered {
            batch.triggered = self.spawn_flush(id, false);
        }
    }

    /// Spawns the flush of `id` on the current runtime, optionally after the
    /// configured schedule delay. Returns false if no runtime is available, in
    /// which case the flush happens when a handle is polled.
    fn spawn_flush(self: &Arc<Self>, id: BatchId, delayed: bool) -> bool {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return false;
        };
        let delay = delayed.then(|| self.schedule_delay());
        let scheduler = Arc::clone(self);
        runtime.spawn(async move {
            if let Some(delay) = delay {
                delay.await;
            }
            scheduler.flush(id).await;
        });
        true
    }

    fn schedule_delay(&self) -> BoxFuture<'static, ()> {
        match &self.config.batch_schedule {
            BatchSchedule::YieldPoint => Box::pin(future::ready(())),
            BatchSchedule::Window(window) => Box::pin(tokio::time::sleep(*window)),
            BatchSchedule::Custom(schedule) => schedule(),
        }
    }

    // == Flush ==
    async fn flush(self: Arc<Self>, id: BatchId) {
        let (dedup, previous) = {
            let mut state = mutex_lock(&self.state, SOURCE, "flush.start");
            if state.open.as_ref().is_some_and(|b| b.id == id) {
                if let Some(batch) = state.open.take() {
                    state.queued.insert(id, batch);
                }
            }
            let Some(batch) = state.queued.get_mut(&id) else {
                return;
            };
            if batch.state != BatchState::Collecting {
                return;
            }
            batch.state = BatchState::Flushing;
            batch.triggered = true;

            let dedup = KeyDeduplicator::new(batch.waiters.iter().map(|w| (&w.cache_key, &w.key)));
            debug!(
                scope = %self.scope_id,
                batch = id,
                waiters = batch.waiters.len(),
                keys = dedup.len(),
                collected_ms = batch.created_at.elapsed().as_millis() as u64,
                "Flushing batch"
            );
            let previous = batch.previous.take();

            // Earlier batches sealed without a runtime must flush before this one can
            for (&earlier, batch) in state.queued.range_mut(..id) {
                if batch.state == BatchState::Collecting && !batch.triggered {
                    batch.triggered = self.spawn_flush(earlier, false);
                }
            }
            (dedup, previous)
        };

        // Successive batches reach the collaborator in creation order
        if let Some(previous) = previous {
            let _ = previous.await;
        }

        {
            let mut state = mutex_lock(&self.state, SOURCE, "flush.dispatch");
            let generation = mutex_lock(&self.cache, SOURCE, "flush.dispatch.cache").generation();
            let Some(batch) = state.queued.get_mut(&id) else {
                debug!(scope = %self.scope_id, batch = id, "Scope closed before dispatch");
                return;
            };
            batch.dispatched_at = Some(generation);
            state.batches_dispatched += 1;
        }
        self.metrics.record_batch(dedup.len());

        let call = self.fetcher.load(dedup.unique_keys());
        let fetched = match self.config.batch_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result.map_err(|e| LoadError::BatchFetch(Arc::new(e))),
                Err(_) => Err(LoadError::Timeout {
                    keys: dedup.len(),
                    after: limit,
                }),
            },
            None => call.await.map_err(|e| LoadError::BatchFetch(Arc::new(e))),
        };

        self.complete(id, &dedup, fetched);
    }

    fn complete(
        &self,
        id: BatchId,
        dedup: &KeyDeduplicator<K>,
        fetched: Result<Vec<KeyOutcome<K, V>>>,
    ) {
        let mut state = mutex_lock(&self.state, SOURCE, "flush.complete");
        let Some(mut batch) = state.queued.remove(&id) else {
            debug!(scope = %self.scope_id, batch = id, "Discarding result for closed scope");
            return;
        };
        batch.state = BatchState::Done;

        let outcomes = fetched.and_then(|outcomes| {
            if outcomes.len() == dedup.len() {
                Ok(self.record_outcomes(id, batch.dispatched_at, dedup, outcomes))
            } else {
                Err(LoadError::BatchFetch(Arc::new(anyhow::anyhow!(
                    "collaborator returned {} outcomes for {} keys",
                    outcomes.len(),
                    dedup.len()
                ))))
            }
        });

        let waiters = std::mem::take(&mut batch.waiters);
        match outcomes {
            Ok(outcomes) => {
                let requested: Vec<K> = waiters.iter().map(|w| w.cache_key.clone()).collect();
                match fan_out(dedup.identities(), &outcomes, &requested) {
                    Some(resolved) => {
                        for (waiter, outcome) in waiters.into_iter().zip(resolved) {
                            waiter.resolve(outcome);
                        }
                    }
                    None => {
                        let error = LoadError::BatchFetch(Arc::new(anyhow::anyhow!(
                            "batch outcomes could not be matched to waiters"
                        )));
                        reject_all(waiters, &error);
                    }
                }
            }
            Err(error) => {
                warn!(scope = %self.scope_id, batch = id, error = %error, "Batch failed");
                reject_all(waiters, &error);
            }
        }

        if let Some(done) = batch.done.take() {
            let _ = done.send(());
        }
    }

    /// Converts collaborator outcomes to waiter outcomes, caching successes
    /// unless the cache was invalidated after `dispatched_at`.
    fn record_outcomes(
        &self,
        id: BatchId,
        dispatched_at: Option<u64>,
        dedup: &KeyDeduplicator<K>,
        outcomes: Vec<KeyOutcome<K, V>>,
    ) -> Vec<Result<V>> {
        let mut cache = self
            .config
            .cache_enabled
            .then(|| mutex_lock(&self.cache, SOURCE, "flush.cache"))
            .filter(|cache| {
                let fresh = dispatched_at == Some(cache.generation());
                if !fresh {
                    debug!(
                        scope = %self.scope_id,
                        batch = id,
                        "Invalidated while in flight, not caching"
                    );
                }
                fresh
            });

        dedup
            .identities()
            .iter()
            .zip(dedup.unique_keys())
            .zip(outcomes)
            .map(|((cache_key, key), outcome)| match outcome {
                Ok(loaded) => {
                    if let Some(cache) = cache.as_mut() {
                        let write = CacheWrite {
                            ttl: loaded.ttl.or(self.config.default_ttl),
                            tags: loaded.tags,
                        };
                        cache.set(self.cache_scope, cache_key.clone(), loaded.value.clone(), write);
                    }
                    Ok(loaded.value)
                }
                Err(cause) => Err(LoadError::key_resolution(key, cause)),
            })
            .collect()
    }

    // == Close ==
    /// Rejects every pending waiter and drops scope-owned cache state.
    ///
    /// Returns the number of waiters rejected, or None if already closed.
    fn close(&self) -> Option<usize> {
        let batches: Vec<Batch<K, V>> = {
            let mut state = mutex_lock(&self.state, SOURCE, "close");
            if state.closed {
                return None;
            }
            state.closed = true;
            state.last_done = None;
            let queued = std::mem::take(&mut state.queued);
            state.open.take().into_iter().chain(queued.into_values()).collect()
        };

        let error = LoadError::ScopeClosed(self.scope_id);
        let mut rejected = 0;
        for batch in batches {
            rejected += batch.waiters.len();
            reject_all(batch.waiters, &error);
        }

        if self.cache_scope != ScopeId::SHARED {
            mutex_lock(&self.cache, SOURCE, "close.cache").clear_scope(self.cache_scope);
        }
        Some(rejected)
    }
}

impl<K, V> FlushTrigger for Scheduler<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn trigger(self: Arc<Self>, id: BatchId) {
        let mut state = mutex_lock(&self.state, SOURCE, "trigger");
        if state.closed {
            return;
        }
        // The open batch keeps collecting until its flush task runs; only a
        // windowed schedule delays that task further.
        let is_open = state.open.as_ref().is_some_and(|b| b.id == id);
        let delayed = is_open && !matches!(self.config.batch_schedule, BatchSchedule::YieldPoint);

        let Some(batch) = state.batch_mut(id) else {
            return;
        };
        if batch.state != BatchState::Collecting || batch.triggered {
            return;
        }
        let spawned = if delayed {
            if batch.scheduled {
                return;
            }
            batch.scheduled = self.spawn_flush(id, true);
            batch.scheduled
        } else {
            batch.triggered = self.spawn_flush(id, false);
            batch.triggered
        };
        if !spawned {
            warn!(scope = %self.scope_id, batch = id, "No tokio runtime available to flush batch");
        }
    }
}

impl<K, V> Drop for Scheduler<K, V> {
    fn drop(&mut self) {
        self.metrics.record_scope_released();
    }
}

fn reject_all<K, V>(waiters: Vec<LoadRequest<K, V>>, error: &LoadError) {
    for waiter in waiters {
        let waited = waiter.enqueued_at.elapsed();
        if waited.as_secs() > 0 {
            debug!(
                scope = %waiter.scope_id,
                waited_ms = waited.as_millis() as u64,
                "Rejecting long-pending load"
            );
        }
        waiter.resolve(Err(error.clone()));
    }
}

// == Load Handle ==
/// The result handle returned by [`Loader::load`].
///
/// Resolves once with the value or a typed error. Polling a handle of a
/// collecting batch for the first time schedules that batch's flush.
pub struct LoadHandle<V> {
    state: HandleState<V>,
}

enum HandleState<V> {
    Ready(Option<Result<V>>),
    Pending {
        scope_id: ScopeId,
        receiver: oneshot::Receiver<Result<V>>,
        trigger: Option<(Arc<dyn FlushTrigger>, BatchId)>,
    },
}

impl<V> LoadHandle<V> {
    fn ready(outcome: Result<V>) -> Self {
        Self {
            state: HandleState::Ready(Some(outcome)),
        }
    }

    fn pending(
        scope_id: ScopeId,
        receiver: oneshot::Receiver<Result<V>>,
        trigger: Option<(Arc<dyn FlushTrigger>, BatchId)>,
    ) -> Self {
        Self {
            state: HandleState::Pending {
                scope_id,
                receiver,
                trigger,
            },
        }
    }

    /// True if the handle was resolved at `load` time (cache hit or closed scope).
    pub fn is_ready(&self) -> bool {
        matches!(self.state, HandleState::Ready(_))
    }
}

// The value is only ever moved out, never pinned in place.
impl<V> Unpin for LoadHandle<V> {}

impl<V> Future for LoadHandle<V> {
    type Output = Result<V>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            HandleState::Ready(outcome) => {
                Poll::Ready(outcome.take().expect("LoadHandle polled after completion"))
            }
            HandleState::Pending {
                scope_id,
                receiver,
                trigger,
            } => {
                if let Some((scheduler, batch)) = trigger.take() {
                    scheduler.trigger(batch);
                }
                let scope_id = *scope_id;
                Pin::new(receiver)
                    .poll(cx)
                    .map(|received| received.unwrap_or(Err(LoadError::ScopeClosed(scope_id))))
            }
        }
    }
}

impl<V> Debug for LoadHandle<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadHandle")
            .field("ready", &self.is_ready())
            .finish()
    }
}

// == Loader ==
/// Engine handle for one scope.
///
/// Cloning is cheap and every clone addresses the same scope. Obtain one from
/// [`ScopeManager::create_scope`](crate::ScopeManager::create_scope).
pub struct Loader<K, V> {
    inner: Arc<Scheduler<K, V>>,
}

impl<K, V> Clone for Loader<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Loader<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        scope_id: ScopeId,
        config: LoaderConfig<K>,
        fetcher: Arc<dyn BatchFn<K, V>>,
        cache: SharedCache<K, V>,
        shared_region: bool,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        let cache_scope = if shared_region { ScopeId::SHARED } else { scope_id };
        let scheduler = Scheduler {
            scope_id,
            cache_scope,
            config,
            fetcher,
            cache,
            metrics,
            state: Mutex::new(SchedulerState {
                closed: false,
                next_batch_id: 1,
                open: None,
                queued: BTreeMap::new(),
                last_done: None,
                batches_dispatched: 0,
            }),
        };
        Self {
            inner: Arc::new(scheduler),
        }
    }

    // == Load ==
    /// Requests the value for `key`.
    ///
    /// Never blocks. A cache hit returns an already-resolved handle; otherwise
    /// the key joins the current batch.
    pub fn load(&self, key: K) -> LoadHandle<V> {
        self.inner.enqueue(key)
    }

    /// Requests every key in order; the output is aligned with the input,
    /// duplicates included.
    ///
    /// All keys are enqueued before this returns, so they share a batch.
    pub fn load_many(&self, keys: impl IntoIterator<Item = K>) -> JoinAll<LoadHandle<V>> {
        let handles: Vec<LoadHandle<V>> = keys.into_iter().map(|key| self.load(key)).collect();
        future::join_all(handles)
    }

    // == Cache Control ==
    /// Removes the cached value for `key` and everything tagged with it.
    pub fn clear(&self, key: &K) -> usize {
        let cache_key = self.inner.config.cache_key(key);
        mutex_lock(&self.inner.cache, SOURCE, "clear").invalidate(self.inner.cache_scope, &cache_key)
    }

    /// Removes every cached value of this scope.
    pub fn clear_all(&self) -> usize {
        mutex_lock(&self.inner.cache, SOURCE, "clear_all").clear_scope(self.inner.cache_scope)
    }

    /// Removes every cached value registered under `tag`, transitively.
    pub fn invalidate_tag(&self, tag: &K) -> usize {
        mutex_lock(&self.inner.cache, SOURCE, "invalidate_tag")
            .invalidate_tag(self.inner.cache_scope, tag)
    }

    /// Seeds the cache without a fetch. Does nothing if a live value exists,
    /// caching is disabled, or the scope is closed.
    pub fn prime(&self, key: K, value: V) -> bool {
        if !self.inner.config.cache_enabled || self.is_closed() {
            return false;
        }
        let cache_key = self.inner.config.cache_key(&key);
        mutex_lock(&self.inner.cache, SOURCE, "prime").prime(
            self.inner.cache_scope,
            cache_key,
            value,
            self.inner.config.default_ttl,
        )
    }

    // == Introspection ==
    /// Identifier of this loader's scope.
    pub fn scope_id(&self) -> ScopeId {
        self.inner.scope_id
    }

    /// True once the scope has been destroyed.
    pub fn is_closed(&self) -> bool {
        mutex_lock(&self.inner.state, SOURCE, "is_closed").closed
    }

    /// Number of batches this scope has sent to the collaborator.
    pub fn batches_dispatched(&self) -> u64 {
        mutex_lock(&self.inner.state, SOURCE, "batches_dispatched").batches_dispatched
    }

    /// Number of loads waiting on a batch.
    pub fn pending(&self) -> usize {
        mutex_lock(&self.inner.state, SOURCE, "pending").pending_waiters()
    }

    /// Statistics of the cache region this scope writes to.
    pub fn cache_stats(&self) -> CacheStats {
        mutex_lock(&self.inner.cache, SOURCE, "cache_stats").stats()
    }

    pub(crate) fn close(&self) -> Option<usize> {
        self.inner.close()
    }
}

impl<K, V> Debug for Loader<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("scope_id", &self.inner.scope_id)
            .field("cache_scope", &self.inner.cache_scope)
            .finish()
    }
}
