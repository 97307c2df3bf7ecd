// 响应缓存模块
// 键 -> (值, 写入时间)，按统一 TTL 过期；后端可替换为进程内存或 Redis

pub mod keys;
mod memory;
mod redis_store;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::StoreError;

pub use keys::{communes_key, resultats_key};
pub use memory::MemoryCache;
pub use redis_store::RedisCache;

/// 缓存后端需要提供的能力
pub trait CacheStore: Send + Sync {
    /// 仅返回未过期的值；过期条目视为未命中
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>, StoreError>>;

    /// 无条件写入或覆盖，写入时间取当前时间
    fn put<'a>(&'a self, key: &'a str, value: Value) -> BoxFuture<'a, Result<(), StoreError>>;
}
