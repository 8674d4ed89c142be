//! In-memory memoization of loader results keyed by their arguments.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Defines the behavior of the cache for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read from the cache if a live entry is present;
    /// otherwise compute and write the result to the cache. (Default)
    #[default]
    Use,
    /// Always recompute, bypassing any cached entry, and write the new result.
    Refresh,
    /// Always recompute and do not read from or write to the cache.
    Bypass,
}

/// Identity of a memoized call: which operation, with which arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: &'static str,
    args: String,
}

impl CacheKey {
    pub fn new(operation: &'static str, args: impl Into<String>) -> Self {
        Self {
            operation,
            args: args.into(),
        }
    }

    pub const fn operation(&self) -> &'static str {
        self.operation
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.operation, self.args)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now <= expires_at)
    }
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<CacheKey, CacheEntry>,
    default_ttl: Option<Duration>,
    enabled: bool,
}

impl CacheInner {
    fn get(&self, key: &CacheKey) -> Option<String> {
        let now = Instant::now();
        self.map
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.body.clone())
    }

    fn put(&mut self, key: CacheKey, body: String, ttl_override: Option<Duration>) {
        let expires_at = ttl_override
            .or(self.default_ttl)
            .map(|ttl| Instant::now() + ttl);
        self.map.insert(key, CacheEntry { body, expires_at });
    }
}

/// Thread-safe memo cache storing serialized results.
///
/// With no TTL, entries live for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::process_lifetime()
    }
}

impl CacheStore {
    fn build(default_ttl: Option<Duration>, enabled: bool) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                default_ttl,
                enabled,
            })),
        }
    }

    /// Entries never expire.
    pub fn process_lifetime() -> Self {
        Self::build(None, true)
    }

    /// Entries expire `ttl` after they are written.
    pub fn with_ttl(ttl: Duration) -> Self {
        if ttl.is_zero() {
            return Self::disabled();
        }
        Self::build(Some(ttl), true)
    }

    /// A store that never keeps anything.
    pub fn disabled() -> Self {
        Self::build(None, false)
    }

    /// Get a cached value for the given key if it exists and hasn't expired.
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        let store = self.inner.read().await;
        store.get(key)
    }

    /// Put a value into the cache. No-op when the store is disabled.
    pub async fn put(&self, key: CacheKey, body: String, ttl_override: Option<Duration>) {
        let mut store = self.inner.write().await;
        if !store.enabled {
            return;
        }
        store.put(key, body, ttl_override);
    }

    /// Remove expired entries.
    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        let now = Instant::now();
        store.map.retain(|_, entry| entry.is_live(now));
    }

    /// Clear all entries.
    pub async fn clear(&self) {
        self.inner.write().await.map.clear();
    }

    /// Number of entries, including expired ones not yet cleared.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn is_disabled(&self) -> bool {
        !self.inner.read().await.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(args: &str) -> CacheKey {
        CacheKey::new("snapshot", args)
    }

    #[tokio::test]
    async fn test_cache_store_basic_operations() {
        let cache = CacheStore::process_lifetime();

        assert!(cache.get(&key("AAPL")).await.is_none());

        cache.put(key("AAPL"), "value1".to_string(), None).await;
        assert_eq!(cache.get(&key("AAPL")).await, Some("value1".to_string()));

        cache.put(key("AAPL"), "value2".to_string(), None).await;
        assert_eq!(cache.get(&key("AAPL")).await, Some("value2".to_string()));
    }

    #[tokio::test]
    async fn test_keys_distinguish_operation_and_args() {
        let cache = CacheStore::process_lifetime();

        cache.put(CacheKey::new("snapshot", "AAPL"), "a".to_string(), None).await;
        assert!(cache.get(&CacheKey::new("series", "AAPL")).await.is_none());
        assert!(cache.get(&CacheKey::new("snapshot", "AAPL,MSFT")).await.is_none());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = CacheStore::with_ttl(Duration::from_millis(100));

        cache.put(key("AAPL"), "value1".to_string(), None).await;
        assert!(cache.get(&key("AAPL")).await.is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get(&key("AAPL")).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_ttl_override() {
        let cache = CacheStore::process_lifetime();

        cache
            .put(
                key("AAPL"),
                "value1".to_string(),
                Some(Duration::from_millis(100)),
            )
            .await;

        assert!(cache.get(&key("AAPL")).await.is_some());
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get(&key("AAPL")).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_clear_expired() {
        let cache = CacheStore::with_ttl(Duration::from_millis(100));

        cache.put(key("a"), "value1".to_string(), None).await;
        cache.put(key("b"), "value2".to_string(), None).await;
        assert_eq!(cache.len().await, 2);

        tokio::time::sleep(Duration::from_millis(150)).await;
        cache.clear_expired().await;

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_disabled() {
        let cache = CacheStore::with_ttl(Duration::ZERO);

        assert!(cache.is_disabled().await);

        cache.put(key("AAPL"), "value1".to_string(), None).await;
        assert!(cache.get(&key("AAPL")).await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[test]
    fn test_cache_mode_default() {
        assert_eq!(CacheMode::default(), CacheMode::Use);
    }
}
