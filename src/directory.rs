//! In-memory user directory used as the backing store of the demo server.
//!
//! Each bulk call sleeps for a fixed latency to stand in for a network round
//! trip, so batching is visible in the server's logs and `/stats`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::fetch::{BatchFn, KeyOutcome, Loaded};

/// A directory record. Users report to `manager_id`, which is itself a user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub manager_id: Option<u64>,
}

impl User {
    fn seeded(id: u64) -> Self {
        Self {
            id,
            name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            // A binary reporting tree rooted at user 1
            manager_id: (id > 1).then_some(id / 2),
        }
    }
}

// == User Directory ==
pub struct UserDirectory {
    users: HashMap<u64, User>,
    latency: Duration,
    calls: AtomicU64,
}

impl UserDirectory {
    /// Seeds users `1..=size`.
    pub fn new(size: u64, latency: Duration) -> Self {
        let users = (1..=size).map(|id| (id, User::seeded(id))).collect();
        Self {
            users,
            latency,
            calls: AtomicU64::new(0),
        }
    }

    /// Number of bulk calls served so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl BatchFn<u64, User> for UserDirectory {
    async fn load(&self, keys: &[u64]) -> anyhow::Result<Vec<KeyOutcome<u64, User>>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        debug!(keys = keys.len(), "Directory bulk lookup");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        Ok(keys
            .iter()
            .map(|id| match self.users.get(id) {
                // Cached reports are dropped when their manager is invalidated
                Some(user) => Ok(Loaded::new(user.clone()).with_tags(user.manager_id)),
                None => Err(anyhow::anyhow!("user {} not found", id)),
            })
            .collect())
    }
}
