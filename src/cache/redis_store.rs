use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use redis::{AsyncCommands, Client as RedisClient};
use serde_json::Value;

use super::CacheStore;
use crate::error::StoreError;

/// Redis 中缓存条目的键前缀
const CACHE_PREFIX: &str = "apw:cache:";

/// 生成 Redis 中的缓存键
fn redis_key(key: &str) -> String {
    format!("{}{}", CACHE_PREFIX, key)
}

/// TTL 毫秒数，至少 1 毫秒，PSETEX 不接受 0
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn encode(value: &Value) -> Result<String, StoreError> {
    Ok(serde_json::to_string(value)?)
}

fn decode(stored: Option<String>) -> Result<Option<Value>, StoreError> {
    match stored {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Redis 缓存，过期由 Redis 的 PSETEX 负责，多个实例共享
pub struct RedisCache {
    redis_client: Arc<RedisClient>,
    ttl: Duration,
}

impl RedisCache {
    pub fn new(redis_client: Arc<RedisClient>, ttl: Duration) -> Self {
        Self { redis_client, ttl }
    }

    async fn fetch(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let stored: Option<String> = conn.get(redis_key(key)).await?;
        decode(stored)
    }

    async fn store(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let json = encode(&value)?;
        let _: () = conn
            .pset_ex(redis_key(key), json, ttl_millis(self.ttl))
            .await?;

        Ok(())
    }
}

impl CacheStore for RedisCache {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>, StoreError>> {
        self.fetch(key).boxed()
    }

    fn put<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<(), StoreError>> {
        self.store(key, value).boxed()
    }
}
