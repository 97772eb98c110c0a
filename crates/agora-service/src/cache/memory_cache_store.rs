//! In-process cache store.

use super::CacheStore;
use agora_core::AgoraResult;
use async_trait::async_trait;
use parking_lot::RwLock;
use shaku::Component;
use std::collections::{HashMap, HashSet};

/// Set store held in process memory.
///
/// Mirrors Redis set semantics, including the removal of emptied sets, so
/// the like engine behaves the same on either store. Contents are lost on
/// restart and are not shared between instances.
#[derive(Component, Default)]
#[shaku(interface = CacheStore)]
pub struct MemoryCacheStore {
    #[shaku(default)]
    sets: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemoryCacheStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of existing keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.read().len()
    }

    /// Returns true if no key exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.read().is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn add_to_set(&self, key: &str, member: &str) -> AgoraResult<bool> {
        let mut sets = self.sets.write();
        Ok(sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn add_all_to_set(&self, key: &str, members: &[String]) -> AgoraResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }

        let mut sets = self.sets.write();
        let set = sets.entry(key.to_string()).or_default();
        let added = members
            .iter()
            .filter(|member| set.insert((*member).clone()))
            .count();
        Ok(added as u64)
    }

    async fn remove_from_set(&self, key: &str, member: &str) -> AgoraResult<bool> {
        let mut sets = self.sets.write();
        let Some(set) = sets.get_mut(key) else {
            return Ok(false);
        };

        let removed = set.remove(member);
        if set.is_empty() {
            sets.remove(key);
        }
        Ok(removed)
    }

    async fn set_contains(&self, key: &str, member: &str) -> AgoraResult<bool> {
        Ok(self
            .sets
            .read()
            .get(key)
            .is_some_and(|set| set.contains(member)))
    }

    async fn set_members(&self, key: &str) -> AgoraResult<HashSet<String>> {
        Ok(self.sets.read().get(key).cloned().unwrap_or_default())
    }

    async fn set_size(&self, key: &str) -> AgoraResult<u64> {
        Ok(self.sets.read().get(key).map_or(0, |set| set.len() as u64))
    }

    async fn keys_matching(&self, pattern: &str) -> AgoraResult<HashSet<String>> {
        let pattern: Vec<char> = pattern.chars().collect();
        Ok(self
            .sets
            .read()
            .keys()
            .filter(|key| glob_match(&pattern, &key.chars().collect::<Vec<_>>()))
            .cloned()
            .collect())
    }
}

impl std::fmt::Debug for MemoryCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheStore")
            .field("keys", &self.len())
            .finish()
    }
}

/// Matches `text` against a glob where `*` is any run and `?` any single char.
fn glob_match(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(&'*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaku::{module, HasComponent};
    use std::sync::Arc;

    module! {
        CacheOnlyModule {
            components = [MemoryCacheStore],
            providers = [],
        }
    }

    fn matches(pattern: &str, text: &str) -> bool {
        glob_match(
            &pattern.chars().collect::<Vec<_>>(),
            &text.chars().collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_glob_match() {
        assert!(matches("post:like:*", "post:like:12"));
        assert!(matches("post:like:*", "post:like:"));
        assert!(matches("post:like:?", "post:like:1"));
        assert!(matches("*:like:*", "comment:like:3"));
        assert!(!matches("post:like:?", "post:like:12"));
        assert!(!matches("post:like:*", "post:likes:loaded"));
        assert!(!matches("post:like:*", "comment:like:1"));
    }

    #[tokio::test]
    async fn test_add_reports_novelty() {
        let store = MemoryCacheStore::new();
        assert!(store.add_to_set("k", "a").await.unwrap());
        assert!(!store.add_to_set("k", "a").await.unwrap());
        assert_eq!(store.set_size("k").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_emptied_set_disappears() {
        let store = MemoryCacheStore::new();
        store.add_to_set("post:like:1", "7").await.unwrap();
        assert!(store.remove_from_set("post:like:1", "7").await.unwrap());
        assert!(!store.remove_from_set("post:like:1", "7").await.unwrap());

        assert!(store.is_empty());
        assert!(store.keys_matching("post:like:*").await.unwrap().is_empty());
        assert_eq!(store.set_size("post:like:1").await.unwrap(), 0);
        assert!(store.set_members("post:like:1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_all_counts_new_members() {
        let store = MemoryCacheStore::new();
        store.add_to_set("k", "1").await.unwrap();

        let added = store
            .add_all_to_set("k", &["1".to_string(), "2".to_string(), "3".to_string()])
            .await
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.add_all_to_set("empty", &[]).await.unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_keys_matching_filters_by_pattern() {
        let store = MemoryCacheStore::new();
        store.add_to_set("post:like:1", "1").await.unwrap();
        store.add_to_set("post:like:2", "1").await.unwrap();
        store.add_to_set("post:likes:loaded", "1").await.unwrap();
        store.add_to_set("comment:like:1", "1").await.unwrap();

        let keys = store.keys_matching("post:like:*").await.unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("post:like:1"));
        assert!(keys.contains("post:like:2"));
    }

    #[tokio::test]
    async fn test_resolves_from_module_without_parameters() {
        let module = CacheOnlyModule::builder().build();
        let store: Arc<dyn CacheStore> = module.resolve();

        assert!(store.add_to_set("post:like:1", "7").await.unwrap());
        let again: Arc<dyn CacheStore> = module.resolve();
        assert!(again.set_contains("post:like:1", "7").await.unwrap());
    }
}
