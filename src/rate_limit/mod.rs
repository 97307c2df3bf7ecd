//! 按客户端标识划分的固定窗口限流
//!
//! 窗口之间不做平滑，窗口边界前后最多可能连续放行 `2 × max` 个请求。
//! 被拒绝的请求同样计入当前窗口。

mod memory;
mod redis_store;

use futures_util::future::BoxFuture;

use crate::error::StoreError;

pub use memory::MemoryRateLimiter;
pub use redis_store::RedisRateLimiter;

/// 限流后端需要提供的能力
pub trait RateLimitStore: Send + Sync {
    /// 记录一次请求，返回是否放行
    fn allow<'a>(&'a self, identifier: &'a str) -> BoxFuture<'a, Result<bool, StoreError>>;
}
