//! Key Deduplication Module
//!
//! Collapses repeated keys into a first-seen ordered unique list and maps
//! per-unique-key outcomes back onto the original request order.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

// == Dedupe ==
/// Returns the unique keys of `keys` in first-seen order.
pub fn dedupe<K>(keys: &[K]) -> Vec<K>
where
    K: Eq + Hash + Clone,
{
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter()
        .filter(|key| seen.insert(*key))
        .cloned()
        .collect()
}

// == Fan Out ==
/// Expands outcomes aligned with `unique` into outcomes aligned with
/// `requested`, cloning the single outcome of a key for each repetition.
///
/// Returns None if `outcomes` is not aligned with `unique` or if a requested
/// key has no unique counterpart.
pub fn fan_out<K, T>(unique: &[K], outcomes: &[T], requested: &[K]) -> Option<Vec<T>>
where
    K: Eq + Hash,
    T: Clone,
{
    if unique.len() != outcomes.len() {
        return None;
    }
    let slots: HashMap<&K, usize> = unique.iter().enumerate().map(|(i, k)| (k, i)).collect();
    requested
        .iter()
        .map(|key| slots.get(key).map(|&slot| outcomes[slot].clone()))
        .collect()
}

// == Key Deduplicator ==
/// Dedupes requested keys by a derived identity (the cache key) while keeping
/// the first-seen original key as the representative sent upstream.
#[derive(Debug, Clone)]
pub struct KeyDeduplicator<K> {
    /// Representative original key per identity, first-seen order
    unique: Vec<K>,
    /// Identity of each representative, aligned with `unique`
    identities: Vec<K>,
}

impl<K> KeyDeduplicator<K>
where
    K: Eq + Hash + Clone,
{
    /// Builds the unique key list for `(identity, original)` pairs.
    pub fn new<'a, I>(requested: I) -> Self
    where
        I: IntoIterator<Item = (&'a K, &'a K)>,
        K: 'a,
    {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        let mut identities = Vec::new();
        for (identity, original) in requested {
            if seen.insert(identity) {
                identities.push(identity.clone());
                unique.push(original.clone());
            }
        }
        Self { unique, identities }
    }

    /// Keys to send to the collaborator, first-seen order.
    pub fn unique_keys(&self) -> &[K] {
        &self.unique
    }

    /// Identities aligned with [`unique_keys`](Self::unique_keys).
    pub fn identities(&self) -> &[K] {
        &self.identities
    }

    pub fn len(&self) -> usize {
        self.unique.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unique.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_first_seen_order() {
        assert_eq!(dedupe(&["a", "b", "a", "c", "b"]), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dedupe_empty() {
        let keys: [u32; 0] = [];
        assert!(dedupe(&keys).is_empty());
    }

    #[test]
    fn test_fan_out_repeats_outcomes() {
        let requested = ["a", "b", "a", "c"];
        let unique = dedupe(&requested);
        let outcomes = ["v_a", "v_b", "v_c"];

        let fanned = fan_out(&unique, &outcomes, &requested).unwrap();
        assert_eq!(fanned, vec!["v_a", "v_b", "v_a", "v_c"]);
    }

    #[test]
    fn test_fan_out_rejects_misaligned_outcomes() {
        assert!(fan_out(&["a", "b"], &[1], &["a"]).is_none());
        assert!(fan_out(&["a"], &[1], &["z"]).is_none());
    }

    #[test]
    fn test_deduplicator_keeps_first_original_per_identity() {
        let originals = ["Alice", "BOB", "alice", "bob", "carol"];
        let identities: Vec<String> = originals.iter().map(|k| k.to_lowercase()).collect();
        let originals: Vec<String> = originals.iter().map(|k| k.to_string()).collect();

        let dedup = KeyDeduplicator::new(identities.iter().zip(originals.iter()));

        assert_eq!(dedup.unique_keys(), ["Alice", "BOB", "carol"]);
        assert_eq!(dedup.identities(), ["alice", "bob", "carol"]);
        assert_eq!(dedup.len(), 3);
    }

    #[test]
    fn test_deduplicator_feeds_fan_out() {
        let keys = [1u64, 2, 1];
        let dedup = KeyDeduplicator::new(keys.iter().zip(keys.iter()));

        let fanned = fan_out(dedup.identities(), &["one", "two"], &keys).unwrap();
        assert_eq!(fanned, vec!["one", "two", "one"]);
        assert!(!dedup.is_empty());
    }
}
