use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::Mutex;

/// In-process response cache keyed by request URL.
///
/// Volatile market data is kept for 60 s, categories for an hour; a hit
/// never touches the network.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    expires_at: Instant,
    payload: Value,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn put(&self, key: &str, payload: Value, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                expires_at: Instant::now() + ttl,
                payload,
            },
        );
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unexpired_entry_is_returned() {
        let cache = ResponseCache::new();
        cache
            .put("k", serde_json::json!({"v": 1}), Duration::from_secs(60))
            .await;

        let hit = cache.get("k").await;
        assert_eq!(hit, Some(serde_json::json!({"v": 1})));
    }

    #[tokio::test]
    async fn expired_entry_is_dropped() {
        let cache = ResponseCache::new();
        cache
            .put("k", serde_json::json!({"v": 1}), Duration::from_secs(0))
            .await;

        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn unknown_key_misses() {
        let cache = ResponseCache::new();
        assert_eq!(cache.get("nope").await, None);
    }
}
