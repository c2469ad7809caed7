//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key deduplication, dependency invalidation and
//! result cache bookkeeping against simple reference models.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

use crate::cache::{CacheWrite, DependencyGraph, ResultCache};
use crate::dedupe::{dedupe, fan_out};
use crate::scope::ScopeId;

// == Test Configuration ==
const SCOPE: ScopeId = ScopeId::from_raw(1);
const OTHER: ScopeId = ScopeId::from_raw(2);

// == Strategies ==
/// Small key space so that repeats and tag collisions are common
fn key_strategy() -> impl Strategy<Value = u8> {
    0u8..16
}

fn tags_strategy() -> impl Strategy<Value = HashSet<u8>> {
    prop::collection::hash_set(key_strategy(), 0..4)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: u8, tags: HashSet<u8> },
    Get { key: u8 },
    Invalidate { key: u8 },
    InvalidateTag { tag: u8 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), tags_strategy()).prop_map(|(key, tags)| CacheOp::Set { key, tags }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Invalidate { key }),
        key_strategy().prop_map(|tag| CacheOp::InvalidateTag { tag }),
    ]
}

// == Reference Model ==
/// Keys removed by invalidating `root`: the root entry itself plus every
/// entry reachable by following "is tagged with" edges backwards.
fn expected_invalidation(model: &HashMap<u8, HashSet<u8>>, root: u8, include_root: bool) -> HashSet<u8> {
    let mut removed = HashSet::new();
    if include_root && model.contains_key(&root) {
        removed.insert(root);
    }
    let mut visited = HashSet::from([root]);
    let mut frontier = vec![root];
    while let Some(tag) = frontier.pop() {
        for (key, tags) in model {
            if tags.contains(&tag) {
                removed.insert(*key);
                if visited.insert(*key) {
                    frontier.push(*key);
                }
            }
        }
    }
    removed
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Dedupe keeps exactly the first occurrence of every key, in order.
    #[test]
    fn prop_dedupe_first_seen_order(keys in prop::collection::vec(key_strategy(), 0..64)) {
        let unique = dedupe(&keys);

        let distinct: HashSet<u8> = keys.iter().copied().collect();
        prop_assert_eq!(unique.len(), distinct.len(), "Unique count mismatch");

        let expected: Vec<u8> = keys
            .iter()
            .enumerate()
            .filter(|(i, key)| keys.iter().position(|k| k == *key) == Some(*i))
            .map(|(_, key)| *key)
            .collect();
        prop_assert_eq!(unique, expected);
    }

    // Fanning out per-unique-key outcomes reproduces a per-request lookup,
    // duplicates included.
    #[test]
    fn prop_fan_out_matches_direct_lookup(keys in prop::collection::vec(key_strategy(), 0..64)) {
        let unique = dedupe(&keys);
        let outcomes: Vec<u32> = unique.iter().map(|k| u32::from(*k) * 10).collect();

        let fanned = fan_out(&unique, &outcomes, &keys);
        let direct: Vec<u32> = keys.iter().map(|k| u32::from(*k) * 10).collect();
        prop_assert_eq!(fanned, Some(direct));
    }

    // Invalidating a tag yields exactly its transitive dependents and leaves
    // no relationship behind for them.
    #[test]
    fn prop_dependency_graph_transitive_closure(
        edges in prop::collection::vec((key_strategy(), tags_strategy()), 0..24),
        root in key_strategy(),
    ) {
        let mut graph = DependencyGraph::new();
        let mut model: HashMap<u8, HashSet<u8>> = HashMap::new();
        for (key, tags) in edges {
            graph.tag(key, tags.iter().copied());
            model.entry(key).or_default().extend(tags);
        }

        let affected = graph.invalidate_tag(&root);

        prop_assert_eq!(&affected, &expected_invalidation(&model, root, false));
        for key in &affected {
            prop_assert!(graph.tags_for_key(key).is_empty(), "Affected key still tagged");
        }
        prop_assert!(graph.keys_for_tag(&root).is_empty());
    }

    // For any sequence of operations without TTLs, the cache agrees with a
    // map model, counters match, and the other scope is never touched.
    #[test]
    fn prop_cache_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut cache: ResultCache<u8, u32> = ResultCache::new();
        cache.set(OTHER, 0, 0, CacheWrite::default());

        let mut model: HashMap<u8, HashSet<u8>> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;
        let mut expected_invalidations: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, tags } => {
                    let write = CacheWrite { ttl: None, tags: tags.clone() };
                    cache.set(SCOPE, key, u32::from(key), write);
                    model.insert(key, tags);
                }
                CacheOp::Get { key } => {
                    let found = cache.get_value(SCOPE, &key);
                    if model.contains_key(&key) {
                        expected_hits += 1;
                        prop_assert_eq!(found, Some(u32::from(key)));
                    } else {
                        expected_misses += 1;
                        prop_assert_eq!(found, None);
                    }
                }
                CacheOp::Invalidate { key } => {
                    let expected = expected_invalidation(&model, key, true);
                    let removed = cache.invalidate(SCOPE, &key);
                    prop_assert_eq!(removed, expected.len(), "Invalidate count mismatch");
                    model.retain(|k, _| !expected.contains(k));
                    expected_invalidations += expected.len() as u64;
                }
                CacheOp::InvalidateTag { tag } => {
                    let expected = expected_invalidation(&model, tag, false);
                    let removed = cache.invalidate_tag(SCOPE, &tag);
                    prop_assert_eq!(removed, expected.len(), "Tag invalidation count mismatch");
                    model.retain(|k, _| !expected.contains(k));
                    expected_invalidations += expected.len() as u64;
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.invalidations, expected_invalidations, "Invalidations mismatch");
        prop_assert_eq!(cache.scope_len(SCOPE), model.len(), "Live entry count mismatch");
        prop_assert_eq!(stats.total_entries, cache.len(), "Total entries mismatch");
        prop_assert!(cache.contains_live(OTHER, &0), "Other scope was modified");
    }

    // Clearing a scope removes all of its entries and nothing else.
    #[test]
    fn prop_clear_scope_is_isolated(
        own in prop::collection::hash_set(key_strategy(), 0..16),
        other in prop::collection::hash_set(key_strategy(), 0..16),
    ) {
        let mut cache: ResultCache<u8, u8> = ResultCache::new();
        for key in &own {
            cache.set(SCOPE, *key, *key, CacheWrite::default());
        }
        for key in &other {
            cache.set(OTHER, *key, *key, CacheWrite::default());
        }

        let removed = cache.clear_scope(SCOPE);

        prop_assert_eq!(removed, own.len());
        prop_assert_eq!(cache.scope_len(SCOPE), 0);
        prop_assert_eq!(cache.scope_len(OTHER), other.len());
    }
}
