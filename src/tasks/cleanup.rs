//! TTL Cleanup Task
//!
//! Expired entries are already ignored on read. Scopes drop their private
//! cache on teardown, but the shared region outlives them, so entries nobody
//! reads again are purged here.

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::lock::mutex_lock;

/// Spawns a task that purges expired entries from `cache` every `interval`.
///
/// The returned handle should be aborted on shutdown.
///
/// # Example
/// ```ignore
/// let cleanup_handle = spawn_cleanup_task(shared_cache, Duration::from_secs(30));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<K, V>(cache: SharedCache<K, V>, interval: Duration) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "Starting shared cache cleanup task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let (removed, remaining) = {
                let mut guard = mutex_lock(&cache, "cleanup", "purge_expired");
                (guard.purge_expired(), guard.len())
            };

            if removed > 0 {
                info!(removed, remaining, "Shared cache cleanup removed expired entries");
            } else {
                debug!(remaining, "Shared cache cleanup found no expired entries");
            }
        }
    })
}
