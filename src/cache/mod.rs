//! Cache Module
//!
//! Scope-keyed result storage with TTL expiration and tag-based dependency
//! invalidation.

mod deps;
mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use std::sync::{Arc, Mutex};

// Re-export public types
pub use deps::DependencyGraph;
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{CacheWrite, ResultCache};

/// A result cache guarded by a single mutex, as owned by a scope or shared
/// across scopes.
pub type SharedCache<K, V> = Arc<Mutex<ResultCache<K, V>>>;
