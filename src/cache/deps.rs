//! Dependency Graph Module
//!
//! Tracks tag → key relationships so that invalidating a tag can cascade to
//! every cache entry registered under it.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

// == Dependency Graph ==
/// Bidirectional tag/key index for one scope.
///
/// Tags share the key type, so a key removed by an invalidation may itself be
/// a tag of other keys; [`DependencyGraph::invalidate_tag`] follows those
/// edges transitively.
#[derive(Debug)]
pub struct DependencyGraph<K> {
    /// Maps tags to all keys currently tagged with them
    tag_to_keys: HashMap<K, HashSet<K>>,
    /// Maps keys to all tags they carry
    key_to_tags: HashMap<K, HashSet<K>>,
}

impl<K> Default for DependencyGraph<K> {
    fn default() -> Self {
        Self {
            tag_to_keys: HashMap::new(),
            key_to_tags: HashMap::new(),
        }
    }
}

impl<K> DependencyGraph<K>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // == Tag ==
    /// Registers `key` under each tag in `tags`.
    ///
    /// Tags are additive; call [`untag`](Self::untag) first to replace them.
    pub fn tag(&mut self, key: K, tags: impl IntoIterator<Item = K>) {
        for tag in tags {
            self.tag_to_keys
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
            self.key_to_tags.entry(key.clone()).or_default().insert(tag);
        }
    }

    // == Untag ==
    /// Removes `key` from every tag set it belongs to.
    pub fn untag(&mut self, key: &K) {
        let Some(tags) = self.key_to_tags.remove(key) else {
            return;
        };
        for tag in tags {
            if let Some(keys) = self.tag_to_keys.get_mut(&tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tag_to_keys.remove(&tag);
                }
            }
        }
    }

    // == Keys For Tag ==
    /// Returns the keys directly tagged with `tag`.
    pub fn keys_for_tag(&self, tag: &K) -> HashSet<K> {
        self.tag_to_keys.get(tag).cloned().unwrap_or_default()
    }

    // == Tags For Key ==
    /// Returns the tags carried by `key`.
    pub fn tags_for_key(&self, key: &K) -> HashSet<K> {
        self.key_to_tags.get(key).cloned().unwrap_or_default()
    }

    // == Invalidate Tag ==
    /// Drops `tag` and returns every key that depends on it, directly or
    /// through keys that are themselves tags.
    ///
    /// Affected keys are untagged as they are collected. A visited set bounds
    /// the walk, so cyclic tag relationships terminate.
    pub fn invalidate_tag(&mut self, tag: &K) -> HashSet<K> {
        let mut affected = HashSet::new();
        let mut visited = HashSet::new();
        let mut pending = vec![tag.clone()];
        visited.insert(tag.clone());

        while let Some(current) = pending.pop() {
            let Some(keys) = self.tag_to_keys.remove(&current) else {
                continue;
            };
            for key in keys {
                self.untag(&key);
                if visited.insert(key.clone()) {
                    pending.push(key.clone());
                }
                affected.insert(key);
            }
        }

        affected
    }

    // == Clear ==
    /// Removes all relationships.
    pub fn clear(&mut self) {
        self.tag_to_keys.clear();
        self.key_to_tags.clear();
    }

    /// Number of tags with at least one key.
    pub fn tag_count(&self) -> usize {
        self.tag_to_keys.len()
    }

    /// Number of keys carrying at least one tag.
    pub fn key_count(&self) -> usize {
        self.key_to_tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tag_to_keys.is_empty() && self.key_to_tags.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(edges: &[(&'static str, &[&'static str])]) -> DependencyGraph<&'static str> {
        let mut graph = DependencyGraph::new();
        for (key, tags) in edges {
            graph.tag(*key, tags.iter().copied());
        }
        graph
    }

    #[test]
    fn test_tag_and_lookup() {
        let graph = graph_with(&[("post:1", &["posts"]), ("post:2", &["posts", "author:9"])]);

        let keys = graph.keys_for_tag(&"posts");
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("post:1"));
        assert!(keys.contains("post:2"));
        assert_eq!(graph.tags_for_key(&"post:2").len(), 2);
    }

    #[test]
    fn test_untag_removes_key_from_every_tag() {
        let mut graph = graph_with(&[("post:2", &["posts", "author:9"])]);

        graph.untag(&"post:2");

        assert!(graph.keys_for_tag(&"posts").is_empty());
        assert!(graph.keys_for_tag(&"author:9").is_empty());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_untag_keeps_other_members() {
        let mut graph = graph_with(&[("post:1", &["posts"]), ("post:2", &["posts"])]);

        graph.untag(&"post:1");

        assert_eq!(graph.keys_for_tag(&"posts").len(), 1);
        assert_eq!(graph.tag_count(), 1);
    }

    #[test]
    fn test_invalidate_tag_returns_direct_members() {
        let mut graph = graph_with(&[("post:1", &["posts"]), ("page:1", &["pages"])]);

        let affected = graph.invalidate_tag(&"posts");

        assert_eq!(affected, HashSet::from(["post:1"]));
        assert_eq!(graph.keys_for_tag(&"pages").len(), 1);
        assert_eq!(graph.key_count(), 1);
    }

    #[test]
    fn test_invalidate_tag_cascades_through_keys() {
        // feed depends on post:1, which depends on author:9
        let mut graph = graph_with(&[("post:1", &["author:9"]), ("feed", &["post:1"])]);

        let affected = graph.invalidate_tag(&"author:9");

        assert_eq!(affected, HashSet::from(["post:1", "feed"]));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_invalidate_tag_terminates_on_cycle() {
        let mut graph = graph_with(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"])]);

        let affected = graph.invalidate_tag(&"a");

        assert_eq!(affected, HashSet::from(["a", "b", "c"]));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_invalidate_unknown_tag() {
        let mut graph = graph_with(&[("post:1", &["posts"])]);
        assert!(graph.invalidate_tag(&"missing").is_empty());
        assert_eq!(graph.key_count(), 1);
    }

    #[test]
    fn test_clear() {
        let mut graph = graph_with(&[("post:1", &["posts"])]);
        graph.clear();
        assert_eq!(graph.tag_count(), 0);
        assert_eq!(graph.key_count(), 0);
    }
}
