//! Result Cache Module
//!
//! Stores resolved values keyed by (scope, key) with TTL expiration and
//! tag-driven cascading invalidation.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, DependencyGraph};
use crate::scope::ScopeId;

// == Cache Write ==
/// Metadata attached to a cache write.
#[derive(Debug, Clone)]
pub struct CacheWrite<K> {
    /// Time to live, None = cache until invalidation or scope teardown
    pub ttl: Option<Duration>,
    /// Dependency tags
    pub tags: HashSet<K>,
}

impl<K> Default for CacheWrite<K> {
    fn default() -> Self {
        Self {
            ttl: None,
            tags: HashSet::new(),
        }
    }
}

impl<K> CacheWrite<K> {
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            tags: HashSet::new(),
        }
    }
}

// == Result Cache ==
/// Value storage for one or more scopes.
///
/// Each scope has its own [`DependencyGraph`], so tags never cross scope
/// boundaries. Expired entries are dropped lazily on lookup and in bulk by
/// [`purge_expired`](Self::purge_expired).
#[derive(Debug)]
pub struct ResultCache<K, V> {
    /// Entry storage
    entries: HashMap<(ScopeId, K), CacheEntry<K, V>>,
    /// Tag relationships per scope
    graphs: HashMap<ScopeId, DependencyGraph<K>>,
    /// Performance statistics
    stats: CacheStats,
    /// Bumped by every invalidation or scope clear
    generation: u64,
}

impl<K, V> Default for ResultCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            graphs: HashMap::new(),
            stats: CacheStats::new(),
            generation: 0,
        }
    }
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Returns the live entry for `key`, if any.
    ///
    /// An expired entry is removed (along with its tag registrations) and
    /// reported as absent.
    pub fn get(&mut self, scope: ScopeId, key: &K) -> Option<&CacheEntry<K, V>> {
        let slot = (scope, key.clone());
        let expired = match self.entries.get(&slot) {
            Some(entry) => entry.is_expired_at(Instant::now()),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(&slot);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            self.sync_total();
            return None;
        }

        self.stats.record_hit();
        self.entries.get(&slot)
    }

    /// Returns a clone of the live value for `key`, if any.
    pub fn get_value(&mut self, scope: ScopeId, key: &K) -> Option<V> {
        self.get(scope, key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry and its tags.
    pub fn set(&mut self, scope: ScopeId, key: K, value: V, write: CacheWrite<K>) {
        let slot = (scope, key.clone());
        if self.entries.contains_key(&slot) {
            self.remove_entry(&slot);
        }

        if !write.tags.is_empty() {
            self.graphs
                .entry(scope)
                .or_default()
                .tag(key.clone(), write.tags.iter().cloned());
        }

        let entry = CacheEntry::new(scope, key, value, write.ttl, write.tags);
        self.entries.insert(slot, entry);
        self.sync_total();
    }

    // == Prime ==
    /// Inserts `value` as if it had been fetched.
    ///
    /// Does nothing if a live entry already exists, so fresher data is never
    /// clobbered. Returns whether the value was stored.
    pub fn prime(&mut self, scope: ScopeId, key: K, value: V, ttl: Option<Duration>) -> bool {
        if self.contains_live(scope, &key) {
            return false;
        }
        self.set(scope, key, value, CacheWrite::with_ttl(ttl));
        true
    }

    // == Invalidate ==
    /// Removes the entry for `key` and every entry that depends on `key` as a
    /// tag. Returns the number of entries removed.
    pub fn invalidate(&mut self, scope: ScopeId, key: &K) -> usize {
        self.generation += 1;
        let mut removed = usize::from(self.remove_entry(&(scope, key.clone())));
        removed += self.invalidate_dependents(scope, key);
        self.stats.record_invalidations(removed);
        self.sync_total();
        removed
    }

    // == Invalidate Tag ==
    /// Removes every entry registered under `tag`, transitively. Returns the
    /// number of entries removed.
    pub fn invalidate_tag(&mut self, scope: ScopeId, tag: &K) -> usize {
        self.generation += 1;
        let removed = self.invalidate_dependents(scope, tag);
        self.stats.record_invalidations(removed);
        self.sync_total();
        removed
    }

    // == Clear Scope ==
    /// Discards all entries and tag relationships of `scope`.
    pub fn clear_scope(&mut self, scope: ScopeId) -> usize {
        self.generation += 1;
        let before = self.entries.len();
        self.entries.retain(|(owner, _), _| *owner != scope);
        self.graphs.remove(&scope);
        self.sync_total();
        before - self.entries.len()
    }

    // == Purge Expired ==
    /// Removes all expired entries across every scope.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<(ScopeId, K)> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(slot, _)| slot.clone())
            .collect();

        for slot in &expired {
            self.remove_entry(slot);
        }

        self.stats.record_expirations(expired.len());
        self.sync_total();
        expired.len()
    }

    /// Returns true if `key` has a live entry, without touching hit/miss counters.
    pub fn contains_live(&self, scope: ScopeId, key: &K) -> bool {
        self.entries
            .get(&(scope, key.clone()))
            .is_some_and(|entry| !entry.is_expired_at(Instant::now()))
    }

    /// Returns the keys directly tagged with `tag` in `scope`.
    pub fn keys_for_tag(&self, scope: ScopeId, tag: &K) -> HashSet<K> {
        self.graphs
            .get(&scope)
            .map(|graph| graph.keys_for_tag(tag))
            .unwrap_or_default()
    }

    /// Invalidation counter of this region. A value fetched before the
    /// counter moved may be stale and must not be written back.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries owned by `scope`.
    pub fn scope_len(&self, scope: ScopeId) -> usize {
        self.entries.keys().filter(|(owner, _)| *owner == scope).count()
    }

    // == Internals ==
    fn remove_entry(&mut self, slot: &(ScopeId, K)) -> bool {
        let Some(_) = self.entries.remove(slot) else {
            return false;
        };
        if let Some(graph) = self.graphs.get_mut(&slot.0) {
            graph.untag(&slot.1);
            if graph.is_empty() {
                self.graphs.remove(&slot.0);
            }
        }
        true
    }

    fn invalidate_dependents(&mut self, scope: ScopeId, tag: &K) -> usize {
        let Some(graph) = self.graphs.get_mut(&scope) else {
            return 0;
        };
        let affected = graph.invalidate_tag(tag);
        affected
            .into_iter()
            .filter(|key| self.remove_entry(&(scope, key.clone())))
            .count()
    }

    fn sync_total(&mut self) {
        self.stats.set_total_entries(self.entries.len());
    }
}
