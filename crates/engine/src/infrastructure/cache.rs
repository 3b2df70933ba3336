//! TTL-based cache for entity resolutions.
//!
//! Markdown renders resolve the same names over and over (every spell page
//! mentions the same handful of conditions and tables). Resolved entries are
//! kept for a short TTL so bursts of renders cost one lookup per name.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// A thread-safe cache with time-to-live expiration.
///
/// Entries are considered expired after the configured TTL, but are not
/// removed until `cleanup_expired()` is called.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, TtlEntry<V>>>,
    ttl: Duration,
}

struct TtlEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> TtlEntry<V> {
    fn is_live(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Create a new cache with the specified TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert a value, replacing any existing entry and resetting the TTL.
    pub async fn insert(&self, key: K, value: V) {
        let entry = TtlEntry {
            value,
            inserted_at: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Insert a batch of values under a single write lock.
    pub async fn insert_many(&self, values: impl IntoIterator<Item = (K, V)>) {
        let now = Instant::now();
        let mut guard = self.entries.write().await;
        for (key, value) in values {
            guard.insert(
                key,
                TtlEntry {
                    value,
                    inserted_at: now,
                },
            );
        }
    }

    /// Insert a value with an explicit timestamp (tests only).
    #[cfg(test)]
    pub async fn insert_at(&self, key: K, value: V, inserted_at: Instant) {
        let entry = TtlEntry { value, inserted_at };
        self.entries.write().await.insert(key, entry);
    }

    /// Get a value if it exists and hasn't expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let guard = self.entries.read().await;
        guard
            .get(key)
            .filter(|entry| entry.is_live(self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Look up a batch of keys under a single read lock. Only live hits are
    /// returned.
    pub async fn get_many<'k>(&self, keys: impl IntoIterator<Item = &'k K>) -> HashMap<K, V>
    where
        K: 'k,
    {
        let guard = self.entries.read().await;
        keys.into_iter()
            .filter_map(|key| {
                guard
                    .get(key)
                    .filter(|entry| entry.is_live(self.ttl))
                    .map(|entry| (key.clone(), entry.value.clone()))
            })
            .collect()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Remove the entries matching `predicate` and return how many went.
    pub async fn remove_where(&self, mut predicate: impl FnMut(&K, &V) -> bool) -> usize {
        let mut guard = self.entries.write().await;
        let before_count = guard.len();
        guard.retain(|key, entry| !predicate(key, &entry.value));
        before_count - guard.len()
    }

    /// Remove all expired entries and return the count of removed entries.
    pub async fn cleanup_expired(&self) -> usize {
        let mut guard = self.entries.write().await;
        let before_count = guard.len();
        guard.retain(|_, entry| entry.is_live(self.ttl));
        before_count - guard.len()
    }

    /// Get the current number of entries (including expired ones not yet cleaned).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn key(name: &str) -> (String, String) {
        ("spell".to_string(), name.to_string())
    }

    #[tokio::test]
    async fn insert_and_get() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert(key("fireball"), 12).await;
        assert_eq!(cache.get(&key("fireball")).await, Some(12));
        assert_eq!(cache.get(&key("missing")).await, None);
    }

    #[tokio::test]
    async fn remove_where_keeps_the_rest() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache
            .insert_many(vec![
                (key("fireball"), 2),
                (("feat".to_string(), "dodge".to_string()), 3),
            ])
            .await;

        let removed = cache.remove_where(|(kind, _), _| kind == "spell").await;
        assert_eq!(removed, 1);
        assert_eq!(cache.get(&key("fireball")).await, None);
        assert_eq!(cache.get(&("feat".to_string(), "dodge".to_string())).await, Some(3));
    }

    #[tokio::test]
    async fn get_many_returns_only_live_hits() {
        let ttl = Duration::from_millis(10);
        let cache = TtlCache::new(ttl);
        let expired_at = Instant::now() - (ttl + Duration::from_millis(1));
        cache.insert_at(key("sleep"), 1, expired_at).await;
        cache
            .insert_many(vec![(key("fireball"), 2), (key("haste"), 3)])
            .await;

        let wanted = [key("sleep"), key("fireball"), key("unknown")];
        let hits = cache.get_many(wanted.iter()).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.get(&key("fireball")), Some(&2));
    }

    #[tokio::test]
    async fn expired_entries_not_returned() {
        let ttl = Duration::from_millis(10);
        let cache = TtlCache::new(ttl);
        let expired_at = Instant::now() - (ttl + Duration::from_millis(1));
        cache.insert_at(key("fireball"), 42, expired_at).await;

        assert_eq!(cache.get(&key("fireball")).await, None);
    }

    #[tokio::test]
    async fn cleanup_removes_expired() {
        let ttl = Duration::from_millis(10);
        let cache = TtlCache::new(ttl);
        let expired_at = Instant::now() - (ttl + Duration::from_millis(1));
        cache.insert_at(key("a"), 1, expired_at).await;
        cache.insert_at(key("b"), 2, expired_at).await;
        cache.insert(key("c"), 3).await;

        let removed = cache.cleanup_expired().await;
        assert_eq!(removed, 2);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&key("c")).await, Some(3));
    }

    #[tokio::test]
    async fn clear_empties_the_cache() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert(key("fireball"), 1).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
