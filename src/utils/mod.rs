use axum::{
    Json,
    http::header::CACHE_CONTROL,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::Value;

/// 成功响应统一带上 Cache-Control
pub fn success_response(body: Value, max_age_secs: u64) -> Response {
    (
        [(CACHE_CONTROL, format!("public, max-age={}", max_age_secs))],
        Json(body),
    )
        .into_response()
}

/// 当前 Unix 时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
