use dashmap::DashMap;
use std::time::{Duration, Instant};

/// A thread-safe, TTL-bounded store keyed by asset symbol.
///
/// `get` returns `None` both when a key was never set and when its entry
/// has aged past the TTL; callers cannot distinguish the two. Writes are
/// last-write-wins with no coordination; entries are immutable value
/// objects, so a stale overwrite is never worse than a cache miss.
pub struct TtlCache<V> {
    data: DashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: DashMap::new(),
            ttl,
        }
    }

    /// Get a live value, evicting the entry if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.data.get(key)?;
        if entry.created_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            drop(entry);
            self.data.remove(key);
            None
        }
    }

    /// Insert or replace the value for a key.
    pub fn put(&self, key: String, value: V) {
        self.data.insert(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
            },
        );
    }

    /// Remove an entry, returning it regardless of expiry.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.data.remove(key).map(|(_, entry)| entry.value)
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Number of entries (including entries past their TTL).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_put() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("btc-usd".to_string(), 42);
        assert_eq!(cache.get("btc-usd"), Some(42));
        assert_eq!(cache.get("eth-usd"), None);
    }

    #[test]
    fn test_expiry() {
        let cache = TtlCache::new(Duration::from_millis(10));
        cache.put("btc-usd".to_string(), 42);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("btc-usd"), None);
    }

    #[test]
    fn test_expired_and_missing_are_indistinguishable() {
        let cache = TtlCache::new(Duration::from_millis(10));
        cache.put("expired".to_string(), 1);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("expired"), cache.get("never-set"));
    }

    #[test]
    fn test_overwrite_wins() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("key".to_string(), 1);
        cache.put("key".to_string(), 2);
        assert_eq!(cache.get("key"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_refreshes_ttl() {
        let cache = TtlCache::new(Duration::from_millis(30));
        cache.put("key".to_string(), 1);
        std::thread::sleep(Duration::from_millis(20));
        cache.put("key".to_string(), 2);
        std::thread::sleep(Duration::from_millis(20));
        // 40ms after first write but 20ms after the replacement.
        assert_eq!(cache.get("key"), Some(2));
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        assert_eq!(cache.remove("a"), Some(1));
        assert_eq!(cache.get("a"), None);
        cache.clear();
        assert!(cache.is_empty());
    }
}
