use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use redis::{Client as RedisClient, Script};

use super::RateLimitStore;
use crate::error::StoreError;

/// Redis 中限流计数器的键前缀
const RATE_LIMIT_PREFIX: &str = "apw:rate_limit:";

/// 计数与设置过期在服务端一次执行；键没有过期时间时重新设置，防止计数器永不重置
const INCR_WINDOW_SCRIPT: &str = r"
local count = redis.call('INCR', KEYS[1])
if count == 1 or redis.call('PTTL', KEYS[1]) == -1 then
    redis.call('PEXPIRE', KEYS[1], ARGV[1])
end
return count
";

/// 生成限流计数器键
fn rate_limit_key(identifier: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, identifier)
}

/// 窗口毫秒数，至少 1 毫秒
fn window_millis(window: Duration) -> u64 {
    u64::try_from(window.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// 基于 Redis INCR 的固定窗口计数器，多个实例共享同一份计数
#[derive(Clone)]
pub struct RedisRateLimiter {
    redis_client: Arc<RedisClient>,
    window: Duration,
    max_requests: u64,
}

impl RedisRateLimiter {
    pub fn new(redis_client: Arc<RedisClient>, max_requests: u64, window: Duration) -> Self {
        Self {
            redis_client,
            window,
            max_requests,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_requests > 0
    }

    async fn check(&self, identifier: &str) -> Result<bool, StoreError> {
        if !self.is_enabled() {
            return Ok(true);
        }

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let count: u64 = Script::new(INCR_WINDOW_SCRIPT)
            .key(rate_limit_key(identifier))
            .arg(window_millis(self.window))
            .invoke_async(&mut conn)
            .await?;

        Ok(count <= self.max_requests)
    }
}

impl RateLimitStore for RedisRateLimiter {
    fn allow<'a>(&'a self, identifier: &'a str) -> BoxFuture<'a, Result<bool, StoreError>> {
        self.check(identifier).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 未监听的地址；`Client::open` 不会建立连接
    fn offline_client() -> Arc<RedisClient> {
        Arc::new(RedisClient::open("redis://127.0.0.1:1/").unwrap())
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(rate_limit_key("203.0.113.1"), "apw:rate_limit:203.0.113.1");
        assert_eq!(rate_limit_key("unknown"), "apw:rate_limit:unknown");
    }

    #[test]
    fn window_is_at_least_one_millisecond() {
        assert_eq!(window_millis(Duration::ZERO), 1);
        assert_eq!(window_millis(Duration::from_micros(500)), 1);
        assert_eq!(window_millis(Duration::from_secs(60)), 60_000);
    }

    #[tokio::test]
    async fn zero_max_never_touches_redis() {
        let limiter = RedisRateLimiter::new(offline_client(), 0, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.allow("203.0.113.1").await.unwrap());
        }
    }

    #[tokio::test]
    async fn enabled_limiter_reports_store_errors() {
        let limiter = RedisRateLimiter::new(offline_client(), 5, Duration::from_secs(60));
        assert!(matches!(
            limiter.allow("203.0.113.1").await,
            Err(StoreError::Redis(_))
        ));
    }
}
