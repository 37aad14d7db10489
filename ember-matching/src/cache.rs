//! Process-local response cache for candidate and match lists.
//!
//! Entries carry an absolute expiry and are idempotently reconstructible
//! from the backing store, so readers and writers only need
//! last-write-wins semantics per key. Nothing survives a restart.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use uuid::Uuid;

struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

pub struct LocalCache {
    store: DashMap<String, CacheEntry>,
}

impl LocalCache {
    pub fn new() -> Self {
        Self {
            store: DashMap::new(),
        }
    }

    /// Deterministic per-user key. Including the user id partitions the
    /// key space so one user's lists can never be served to another.
    pub fn user_key(user_id: Uuid, discriminator: &str) -> String {
        format!("user:{user_id}:{discriminator}")
    }

    /// Returns the stored value if present and not expired. An expired
    /// entry is dropped on the spot and behaves exactly like a miss, as
    /// does a stored value that no longer deserializes to `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.store.get(key)?;
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.store.remove(key);
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    /// Stores `value` with absolute expiry now + `ttl`, overwriting any
    /// existing entry for the key.
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(key, error = %err, "failed to serialize cache value");
                return;
            }
        };
        self.store.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drops expired entries. Called periodically from a background task
    /// so keys that are never read again do not accumulate.
    pub fn evict_expired(&self) -> usize {
        let before = self.store.len();
        let now = Instant::now();
        self.store.retain(|_, entry| entry.expires_at > now);
        before - self.store.len()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_roundtrip() {
        let cache = LocalCache::new();
        cache.set("k", &vec![1, 2, 3], Duration::from_secs(60));
        assert_eq!(cache.get::<Vec<i32>>("k"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn absent_and_expired_behave_identically() {
        let cache = LocalCache::new();
        assert_eq!(cache.get::<String>("missing"), None);

        cache.set("k", &"v".to_string(), Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get::<String>("k"), None);
        // The expired entry was dropped on read
        assert!(cache.is_empty());
    }

    #[test]
    fn set_overwrites() {
        let cache = LocalCache::new();
        cache.set("k", &1u32, Duration::from_secs(60));
        cache.set("k", &2u32, Duration::from_secs(60));
        assert_eq!(cache.get::<u32>("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn type_mismatch_is_a_miss() {
        let cache = LocalCache::new();
        cache.set("k", &"not a number".to_string(), Duration::from_secs(60));
        assert_eq!(cache.get::<u64>("k"), None);
    }

    #[test]
    fn user_keys_never_collide_across_users() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_ne!(
            LocalCache::user_key(a, "user-matches"),
            LocalCache::user_key(b, "user-matches")
        );
        assert_eq!(
            LocalCache::user_key(a, "matches:50:0"),
            LocalCache::user_key(a, "matches:50:0")
        );
    }

    #[test]
    fn evict_expired_sweeps_dead_entries() {
        let cache = LocalCache::new();
        cache.set("dead", &1u32, Duration::from_millis(5));
        cache.set("alive", &2u32, Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(10));

        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get::<u32>("alive"), Some(2));
    }
}
