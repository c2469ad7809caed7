//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and tag support.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::Instant;

use crate::scope::ScopeId;

// == Cache Entry ==
/// Represents a single resolved value with its metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The cache key the value was stored under
    pub key: K,
    /// The stored value
    pub value: V,
    /// Monotonic creation time
    pub created_at: Instant,
    /// Time to live, None = no expiration
    pub ttl: Option<Duration>,
    /// Dependency tags the entry is registered under
    pub tags: HashSet<K>,
    /// Owning scope (or [`ScopeId::SHARED`])
    pub scope_id: ScopeId,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current monotonic time.
    pub fn new(scope_id: ScopeId, key: K, value: V, ttl: Option<Duration>, tags: HashSet<K>) -> Self {
        Self {
            key,
            value,
            created_at: Instant::now(),
            ttl,
            tags,
            scope_id,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// An entry is expired once strictly more than `ttl` has elapsed since
    /// creation; entries without a TTL never expire.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(self.created_at) > ttl,
            None => false,
        }
    }

    /// Checks if the entry has expired as of the current time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the TTL has elapsed
    /// - `Some(remaining)` if the entry has a TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.ttl
            .map(|ttl| ttl.saturating_sub(self.created_at.elapsed()))
    }
}
