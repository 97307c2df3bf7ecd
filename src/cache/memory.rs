use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;

use super::CacheStore;
use crate::error::StoreError;

/// 进程内缓存，只按 TTL 过期，读取时惰性删除
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

struct CacheEntry {
    value: Value,
    inserted_at: Instant,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) <= self.ttl
    }

    pub fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if self.is_fresh(&entry, now) {
                return Some(entry.value.clone());
            }
        }

        // 只删除仍然过期的条目，避免误删并发写入的新值
        self.entries
            .remove_if(key, |_, entry| !self.is_fresh(entry, now));
        None
    }

    pub fn put_at(&self, key: &str, value: Value, now: Instant) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>, StoreError>> {
        futures_util::future::ready(Ok(self.get_at(key, Instant::now()))).boxed()
    }

    fn put<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<(), StoreError>> {
        self.put_at(key, value, Instant::now());
        futures_util::future::ready(Ok(())).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn fresh_entry_is_returned_up_to_ttl() {
        let cache = MemoryCache::new(TTL);
        let t0 = Instant::now();
        cache.put_at("communes:75001", json!([{ "nom": "Paris" }]), t0);

        assert_eq!(
            cache.get_at("communes:75001", t0),
            Some(json!([{ "nom": "Paris" }]))
        );
        assert_eq!(
            cache.get_at("communes:75001", t0 + TTL),
            Some(json!([{ "nom": "Paris" }]))
        );
    }

    #[test]
    fn stale_entry_is_a_miss_and_evicted() {
        let cache = MemoryCache::new(TTL);
        let t0 = Instant::now();
        cache.put_at("communes:75001", json!([]), t0);

        assert_eq!(
            cache.get_at("communes:75001", t0 + TTL + Duration::from_millis(1)),
            None
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn put_overwrites_and_restarts_ttl() {
        let cache = MemoryCache::new(TTL);
        let t0 = Instant::now();
        cache.put_at("k", json!(1), t0);
        cache.put_at("k", json!(2), t0 + Duration::from_secs(50));

        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(100)), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unknown_key_is_a_miss() {
        let cache = MemoryCache::new(TTL);
        assert_eq!(cache.get_at("resultats:75056:", Instant::now()), None);
    }

    #[tokio::test]
    async fn store_trait_round_trip() {
        let cache = MemoryCache::new(TTL);
        cache.put("k", json!({ "ok": true })).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!({ "ok": true })));
    }
}
