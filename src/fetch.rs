//! Backing-store collaborator interface.
//!
//! The engine calls [`BatchFn::load`] exactly once per batch with the batch's
//! unique keys. Retries, connection pooling and rate limiting belong to the
//! implementor.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

/// Per-key result of a bulk fetch.
pub type KeyOutcome<K, V> = anyhow::Result<Loaded<K, V>>;

// == Loaded ==
/// A fetched value plus optional cache metadata.
#[derive(Debug, Clone)]
pub struct Loaded<K, V> {
    pub value: V,
    /// Overrides the engine's default TTL when set
    pub ttl: Option<Duration>,
    /// Dependency tags recorded with the cache entry
    pub tags: HashSet<K>,
}

impl<K, V> Loaded<K, V> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            ttl: None,
            tags: HashSet::new(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = K>) -> Self
    where
        K: Eq + std::hash::Hash,
    {
        self.tags.extend(tags);
        self
    }
}

impl<K, V> From<V> for Loaded<K, V> {
    fn from(value: V) -> Self {
        Loaded::new(value)
    }
}

// == Batch Fn ==
/// The bulk-fetch operation of a backing store.
#[async_trait]
pub trait BatchFn<K, V>: Send + Sync {
    /// Resolves `keys` in one call.
    ///
    /// On success the returned vector must hold exactly one outcome per key,
    /// in the same order. Returning `Err` fails every key of the batch.
    async fn load(&self, keys: &[K]) -> anyhow::Result<Vec<KeyOutcome<K, V>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler;

    #[async_trait]
    impl BatchFn<u64, u64> for Doubler {
        async fn load(&self, keys: &[u64]) -> anyhow::Result<Vec<KeyOutcome<u64, u64>>> {
            Ok(keys
                .iter()
                .map(|k| {
                    if *k == 0 {
                        Err(anyhow::anyhow!("zero is not allowed"))
                    } else {
                        Ok(Loaded::new(k * 2).with_tags([k % 2]))
                    }
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_batch_fn_outcomes_align_with_keys() {
        let outcomes = Doubler.load(&[3, 0, 4]).await.unwrap();

        assert_eq!(outcomes.len(), 3);
        let first = outcomes[0].as_ref().unwrap();
        assert_eq!(first.value, 6);
        assert!(first.tags.contains(&1));
        assert!(outcomes[1].is_err());
        assert_eq!(outcomes[2].as_ref().unwrap().value, 8);
    }

    #[test]
    fn test_loaded_builders() {
        let loaded: Loaded<&str, i32> = Loaded::from(7)
            .with_ttl(Duration::from_secs(5))
            .with_tags(["a", "b"]);

        assert_eq!(loaded.value, 7);
        assert_eq!(loaded.ttl, Some(Duration::from_secs(5)));
        assert_eq!(loaded.tags.len(), 2);
    }
}
