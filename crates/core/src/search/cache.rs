//! Short-TTL response cache keyed by normalized query and category.
//!
//! Entries are whole result sets, replaced atomically and never mutated in
//! place. Expiry and eviction are handled by moka.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use super::{SearchQuery, UnifiedResult};

/// Cache key: normalized text plus category (`None` means "all").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub text: String,
    pub category: Option<u32>,
}

impl From<&SearchQuery> for CacheKey {
    fn from(query: &SearchQuery) -> Self {
        Self {
            text: query.text.clone(),
            category: query.category,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            Some(id) => write!(f, "{}|{}", self.text, id),
            None => write!(f, "{}|all", self.text),
        }
    }
}

/// Thread-safe TTL cache with a capacity bound.
#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<CacheKey, Arc<Vec<UnifiedResult>>>,
}

impl ResponseCache {
    /// Hold at most `capacity` result sets, each for `ttl` after it is stored.
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity.max(1))
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// Look up a live entry. Expired entries are reported as a miss.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<UnifiedResult>>> {
        self.cache.get(key)
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: CacheKey, value: Vec<UnifiedResult>) {
        self.cache.insert(key, Arc::new(value));
    }

    /// Number of live entries after pending evictions have been applied.
    pub fn len(&self) -> usize {
        self.cache.run_pending_tasks();
        self.cache.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn key(text: &str, category: Option<u32>) -> CacheKey {
        CacheKey {
            text: text.to_string(),
            category,
        }
    }

    fn result(title: &str) -> UnifiedResult {
        UnifiedResult {
            id: "1".to_string(),
            title: title.to_string(),
            size_bytes: 0,
            seeders: 0,
            leechers: 0,
            published_at: None,
            magnet_uri: None,
            info_hash: String::new(),
            indexer_name: "Unknown".to_string(),
            category_ids: BTreeSet::new(),
            category_label: "Other".to_string(),
        }
    }

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn test_put_then_get() {
        let cache = ResponseCache::new(8, TTL);
        let value = vec![result("A")];
        cache.put(key("a", None), value.clone());

        let cached = cache.get(&key("a", None)).unwrap();
        assert_eq!(*cached, value);
    }

    #[test]
    fn test_expires_after_ttl() {
        let cache = ResponseCache::new(8, Duration::from_millis(50));
        cache.put(key("a", None), vec![result("A")]);
        assert!(cache.get(&key("a", None)).is_some());

        std::thread::sleep(Duration::from_millis(120));
        assert!(cache.get(&key("a", None)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_category_is_part_of_key() {
        let cache = ResponseCache::new(8, TTL);
        cache.put(key("a", Some(2000)), vec![result("A")]);

        assert!(cache.get(&key("a", None)).is_none());
        assert!(cache.get(&key("a", Some(2000))).is_some());
    }

    #[test]
    fn test_put_replaces_wholesale() {
        let cache = ResponseCache::new(8, TTL);
        cache.put(key("a", None), vec![result("Old")]);
        cache.put(key("a", None), vec![result("New")]);

        let cached = cache.get(&key("a", None)).unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].title, "New");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = ResponseCache::new(2, TTL);
        for text in ["a", "b", "c", "d", "e"] {
            cache.put(key(text, None), vec![]);
        }
        assert!(cache.len() <= 2);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(key("matrix", None).to_string(), "matrix|all");
        assert_eq!(key("matrix", Some(2000)).to_string(), "matrix|2000");
    }
}
