use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// `?action=...` 查询参数
///
/// 所有键都允许重复出现，避免提取器拒绝请求；
/// `action`、`postal`、`insee` 只取第一个值，`param_id` 全部保留。
#[derive(Debug, Default, Deserialize)]
pub struct ActionQuery {
    #[serde(default)]
    pub action: Vec<String>,
    #[serde(default)]
    pub postal: Vec<String>,
    #[serde(default)]
    pub insee: Vec<String>,
    #[serde(default)]
    pub param_id: Vec<String>,
}

/// 校验通过的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Ping,
    Communes { postal: String },
    Resultats { insee: String, param_ids: Vec<String> },
}

fn first(values: &[String]) -> Option<&str> {
    values.first().map(|v| v.trim())
}

fn required(values: &[String], missing: &'static str) -> Result<String, AppError> {
    first(values)
        .map(str::to_string)
        .filter(|v| !v.is_empty())
        .ok_or(AppError::Validation(missing))
}

impl TryFrom<ActionQuery> for Action {
    type Error = AppError;

    fn try_from(query: ActionQuery) -> Result<Self, Self::Error> {
        match first(&query.action) {
            Some("ping") => Ok(Action::Ping),
            Some("communes") => Ok(Action::Communes {
                postal: required(&query.postal, "postal manquant")?,
            }),
            Some("resultats") => {
                let insee = required(&query.insee, "insee manquant")?;
                let mut param_ids: Vec<String> = query
                    .param_id
                    .into_iter()
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect();
                param_ids.sort();
                Ok(Action::Resultats { insee, param_ids })
            }
            _ => Err(AppError::InvalidAction),
        }
    }
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Ping => "ping",
            Action::Communes { .. } => "communes",
            Action::Resultats { .. } => "resultats",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RateLimitInfo {
    pub window_ms: u64,
    pub max: u64,
}

/// 存活检查响应
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub ok: bool,
    pub ts: i64,
    pub ip: String,
    pub rl: RateLimitInfo,
}
