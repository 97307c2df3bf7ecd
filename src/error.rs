use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// 上游 Hub'Eau 请求失败
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("fetch {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetch {url} -> {status}")]
    Status { url: String, status: StatusCode },
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 缓存或限流存储失败
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("action invalide")]
    InvalidAction,
    #[error("rate_limited")]
    RateLimited { window_ms: u64, max: u64 },
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            AppError::InvalidAction => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "action invalide" }),
            ),
            AppError::RateLimited { window_ms, max } => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": "rate_limited", "window_ms": window_ms, "max": max }),
            ),
            AppError::Upstream(_) | AppError::Store(_) | AppError::Serialization(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "server_error", "detail": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
