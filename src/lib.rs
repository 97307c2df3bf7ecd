use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tower_http::trace::TraceLayer;

use cache::{CacheStore, MemoryCache};
use config::Config;
use rate_limit::{MemoryRateLimiter, RateLimitStore};
use upstream::HubeauClient;

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod normalize;
pub mod rate_limit;
pub mod routes;
pub mod upstream;
pub mod utils;

/// 进程启动时构建一次，缓存和限流器都由它持有
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub cache: Arc<dyn CacheStore>,
    pub limiter: Arc<dyn RateLimitStore>,
    pub upstream: HubeauClient,
}

impl AppState {
    pub fn new(
        config: Config,
        cache: Arc<dyn CacheStore>,
        limiter: Arc<dyn RateLimitStore>,
    ) -> Result<Self, reqwest::Error> {
        let upstream = HubeauClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            cache,
            limiter,
            upstream,
        })
    }

    /// 使用进程内存作为缓存和限流后端
    pub fn in_memory(config: Config) -> Result<Self, reqwest::Error> {
        let cache = Arc::new(MemoryCache::new(config.cache_ttl()));
        let limiter = Arc::new(MemoryRateLimiter::new(
            config.rate_limit_max,
            config.rate_limit_window(),
        ));
        Self::new(config, cache, limiter)
    }
}

/// 构建完整路由：CORS -> 错误日志 -> 限流 -> 分发
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::proxy::dispatch))
        .route("/api/hubeau", get(routes::proxy::dispatch))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit))
        .layer(from_fn(middleware::log_errors))
        .layer(from_fn_with_state(state.clone(), middleware::cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
