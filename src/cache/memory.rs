use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use super::traits::Cache;

/// In-process TTL cache. Expired entries are dropped lazily on read.
pub struct MemoryCache<V> {
    entries: Mutex<HashMap<String, (V, Instant)>>,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (V, Instant)>> {
        // A poisoned lock still holds consistent data for this map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync + 'static> Cache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();

        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        self.lock()
            .insert(key.to_string(), (value, Instant::now() + ttl));
    }
}
