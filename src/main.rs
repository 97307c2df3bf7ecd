use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use hubeau_proxy::{
    AppState, app,
    cache::{CacheStore, MemoryCache, RedisCache},
    config::{Backend, Config},
    rate_limit::{MemoryRateLimiter, RateLimitStore, RedisRateLimiter},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 定期清理进程内限流器中已结束的窗口
fn spawn_limiter_sweeper(limiter: Arc<MemoryRateLimiter>, window: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(window.max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            limiter.purge_expired();
            tracing::debug!(tracked = limiter.tracked(), "Purged expired rate-limit windows");
        }
    });
}

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    tracing::info!(
        upstream = %config.hubeau_base,
        backend = ?config.backend,
        cache_ttl_ms = config.cache_ttl_ms,
        rate_limit_window_ms = config.rate_limit_window_ms,
        rate_limit_max = config.rate_limit_max,
        upstream_timeout_ms = config.upstream_timeout_ms,
        "Starting Hub'Eau proxy"
    );

    // 设置缓存和限流后端
    let (cache, limiter): (Arc<dyn CacheStore>, Arc<dyn RateLimitStore>) = match config.backend {
        Backend::Memory => {
            let limiter = Arc::new(MemoryRateLimiter::new(
                config.rate_limit_max,
                config.rate_limit_window(),
            ));
            if limiter.is_enabled() {
                spawn_limiter_sweeper(limiter.clone(), config.rate_limit_window());
            }
            let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new(config.cache_ttl()));
            let limiter: Arc<dyn RateLimitStore> = limiter;
            (cache, limiter)
        }
        Backend::Redis => {
            let redis_client = Arc::new(
                redis::Client::open(config.redis_url.clone())
                    .expect("Failed to create Redis client"),
            );
            let cache: Arc<dyn CacheStore> =
                Arc::new(RedisCache::new(redis_client.clone(), config.cache_ttl()));
            let limiter: Arc<dyn RateLimitStore> = Arc::new(RedisRateLimiter::new(
                redis_client,
                config.rate_limit_max,
                config.rate_limit_window(),
            ));
            (cache, limiter)
        }
    };

    // 设置应用状态
    let state = AppState::new(config.clone(), cache, limiter)
        .expect("Failed to build upstream HTTP client");

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
