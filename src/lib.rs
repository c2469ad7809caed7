//! Keyloader - keyed batch loading with scoped result caching
//!
//! Coalesces the individual key lookups issued during one unit of work into
//! a minimal number of bulk fetches, caches the results with TTL and
//! dependency invalidation, and isolates all of that per scope.
//!
//! ```ignore
//! let manager = ScopeManager::new(directory, LoaderConfig::new())?;
//! let loader = manager.create_scope();
//! let (a, b) = tokio::join!(loader.load(1), loader.load(2)); // one bulk call
//! manager.destroy_scope(&loader);
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod dedupe;
pub mod directory;
pub mod error;
pub mod fetch;
mod lock;
pub mod models;
pub mod scheduler;
pub mod scope;
pub mod tasks;

pub use api::AppState;
pub use config::{BatchSchedule, LoaderConfig, ServerConfig};
pub use error::{LoadError, Result};
pub use fetch::{BatchFn, KeyOutcome, Loaded};
pub use scheduler::{LoadHandle, Loader};
pub use scope::{EngineStats, ScopeId, ScopeManager};
pub use tasks::spawn_cleanup_task;
