// src/cache.rs
// Small TTL-based memoization guarding the aggregator and the Notion
// client from redundant upstream calls. Entries are idempotent and cheap
// to recompute, so there is deliberately no single-flight coordination:
// two concurrent misses on the same key may both hit the upstream.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

struct Entry<T> {
    value: T,
    expires_at: Instant,
    tags: Vec<String>,
}

/// In-memory map with per-entry deadlines and tag-based invalidation.
pub struct TtlCache<T> {
    entries: RwLock<HashMap<String, Entry<T>>>,
    default_ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        let expired = {
            let entries = self.entries.read().expect("cache lock poisoned");
            match entries.get(key) {
                None => return None,
                Some(entry) if Instant::now() < entry.expires_at => {
                    return Some(entry.value.clone());
                }
                Some(_) => true,
            }
        };
        if expired {
            self.entries
                .write()
                .expect("cache lock poisoned")
                .remove(key);
        }
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: T) {
        self.insert_with(key, value, self.default_ttl, &[]);
    }

    pub fn insert_with(&self, key: impl Into<String>, value: T, ttl: Duration, tags: &[&str]) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        };
        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(key.into(), entry);
    }

    /// Drop every entry carrying `tag`; returns how many were removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| !entry.tags.iter().any(|t| t == tag));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.write().expect("cache lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn hit_then_expire() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_millis(20));
        cache.insert("k", 7);
        assert_eq!(cache.get("k"), Some(7));

        sleep(Duration::from_millis(30));
        assert_eq!(cache.get("k"), None, "entry must expire after its TTL");
    }

    #[test]
    fn per_entry_ttl_overrides_default() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_millis(5));
        cache.insert_with("long", 1, Duration::from_secs(60), &[]);
        sleep(Duration::from_millis(10));
        assert_eq!(cache.get("long"), Some(1));
    }

    #[test]
    fn tag_invalidation_only_touches_tagged_entries() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        cache.insert_with("a", 1, Duration::from_secs(60), &["qiita-posts"]);
        cache.insert_with("b", 2, Duration::from_secs(60), &["zenn-posts"]);
        cache.insert_with("c", 3, Duration::from_secs(60), &["qiita-posts"]);

        assert_eq!(cache.invalidate_tag("qiita-posts"), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), None);
    }
}
