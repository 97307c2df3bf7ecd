use std::time::{Duration, Instant};

use dashmap::DashMap;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use super::RateLimitStore;
use crate::error::StoreError;

/// 进程内固定窗口计数器，`max_requests = 0` 表示不限流
pub struct MemoryRateLimiter {
    records: DashMap<String, RateRecord>,
    window: Duration,
    max_requests: u64,
}

struct RateRecord {
    window_start: Instant,
    count: u64,
}

impl MemoryRateLimiter {
    pub fn new(max_requests: u64, window: Duration) -> Self {
        Self {
            records: DashMap::new(),
            window,
            max_requests,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_requests > 0
    }

    pub fn allow_at(&self, identifier: &str, now: Instant) -> bool {
        if !self.is_enabled() {
            return true;
        }

        // entry 持有分片写锁，同一标识的计数不会丢失更新
        let mut record = self
            .records
            .entry(identifier.to_string())
            .or_insert(RateRecord {
                window_start: now,
                count: 0,
            });

        if now.saturating_duration_since(record.window_start) > self.window {
            record.window_start = now;
            record.count = 0;
        }

        record.count += 1;
        record.count <= self.max_requests
    }

    /// 清理窗口已结束的记录
    pub fn purge_expired_at(&self, now: Instant) {
        let window = self.window;
        self.records
            .retain(|_, record| now.saturating_duration_since(record.window_start) <= window);
    }

    pub fn purge_expired(&self) {
        self.purge_expired_at(Instant::now());
    }

    pub fn tracked(&self) -> usize {
        self.records.len()
    }
}

impl RateLimitStore for MemoryRateLimiter {
    fn allow<'a>(&'a self, identifier: &'a str) -> BoxFuture<'a, Result<bool, StoreError>> {
        futures_util::future::ready(Ok(self.allow_at(identifier, Instant::now()))).boxed()
    }
}
