use std::future::Future;

use axum::{
    Extension,
    extract::State,
    response::Response,
};
use axum_extra::extract::Query;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    AppState,
    cache::{communes_key, resultats_key},
    error::AppError,
    middleware::ClientId,
    normalize::{normalize_communes, normalize_resultats},
    utils::{now_millis, success_response},
};

use super::model::{Action, ActionQuery, PingResponse, RateLimitInfo};

/// 按 `action` 分发：校验 -> 查缓存 -> 请求上游 -> 归一化 -> 写缓存 -> 响应
pub async fn dispatch(
    State(state): State<AppState>,
    Extension(ClientId(client)): Extension<ClientId>,
    Query(query): Query<ActionQuery>,
) -> Result<Response, AppError> {
    let action = Action::try_from(query)?;
    info!(action = action.name(), %client, "Handling request");

    let body = match &action {
        Action::Ping => serde_json::to_value(PingResponse {
            ok: true,
            ts: now_millis(),
            ip: client,
            rl: RateLimitInfo {
                window_ms: state.config.rate_limit_window_ms,
                max: state.config.rate_limit_max,
            },
        })?,
        Action::Communes { postal } => {
            let key = communes_key(postal);
            cached_or_fetch(&state, &key, async {
                let raw = state.upstream.fetch_communes(postal).await?;
                Ok::<_, AppError>(serde_json::to_value(normalize_communes(&raw, postal))?)
            })
            .await?
        }
        Action::Resultats { insee, param_ids } => {
            let key = resultats_key(insee, param_ids);
            cached_or_fetch(&state, &key, async {
                let raw = state.upstream.fetch_resultats(insee, param_ids).await?;
                Ok::<_, AppError>(serde_json::to_value(normalize_resultats(&raw))?)
            })
            .await?
        }
    };

    Ok(success_response(body, state.config.cache_ttl().as_secs()))
}

/// 命中缓存直接返回，否则执行 `fetch` 并写回缓存
///
/// 缓存读写失败只记录日志，按未命中处理。
/// 同一个键的并发未命中不合并，可能各自请求一次上游。
async fn cached_or_fetch(
    state: &AppState,
    key: &str,
    fetch: impl Future<Output = Result<Value, AppError>>,
) -> Result<Value, AppError> {
    match state.cache.get(key).await {
        Ok(Some(hit)) => {
            debug!(key, "Cache hit");
            return Ok(hit);
        }
        Ok(None) => debug!(key, "Cache miss"),
        Err(e) => warn!(key, error = %e, "Cache read failed, fetching upstream"),
    }

    let value = fetch.await?;

    if let Err(e) = state.cache.put(key, value.clone()).await {
        warn!(key, error = %e, "Cache write failed");
    }
    Ok(value)
}
