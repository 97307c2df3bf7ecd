use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AppError};

/// 无法确定客户端地址时使用的标识
pub const UNKNOWN_CLIENT: &str = "unknown";

/// 限流所用的客户端标识，由中间件写入请求扩展
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

/// 依次取 X-Forwarded-For 的第一个地址、连接地址，最后降级为 "unknown"
pub fn client_identifier(headers: &HeaderMap, remote: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| remote.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

pub async fn rate_limit(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // 从连接信息获取原始地址
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0);
    let client = client_identifier(req.headers(), remote);

    if !state.limiter.allow(&client).await? {
        tracing::warn!(%client, "Rate limit exceeded");
        return Err(AppError::RateLimited {
            window_ms: state.config.rate_limit_window_ms,
            max: state.config.rate_limit_max,
        });
    }

    req.extensions_mut().insert(ClientId(client));
    Ok(next.run(req).await)
}
