//! Hub'Eau HTTP 客户端
//!
//! 每次调用只请求一次，不重试；请求超时由配置限定。

use reqwest::header::{ACCEPT, HeaderValue};
use serde_json::Value;

use crate::config::Config;
use crate::error::UpstreamError;

#[derive(Debug, Clone)]
pub struct HubeauClient {
    http: reqwest::Client,
    base_url: String,
    path_communes: String,
    path_resultats: String,
    page_size: u32,
}

impl HubeauClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.hubeau_base.trim_end_matches('/').to_string(),
            path_communes: config.path_communes.clone(),
            path_resultats: config.path_resultats.clone(),
            page_size: config.page_size,
        })
    }

    /// 按邮政编码查询市镇
    pub async fn fetch_communes(&self, postal: &str) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, self.path_communes);
        self.fetch_json(&url, &[("code_postal", postal.to_string())])
            .await
    }

    /// 查询市镇的分析结果，按时间倒序
    ///
    /// `param_ids` 作为重复的 `code_parametre` 参数传给上游。
    pub async fn fetch_resultats(
        &self,
        insee: &str,
        param_ids: &[String],
    ) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, self.path_resultats);

        let mut query = Vec::with_capacity(param_ids.len() + 3);
        query.push(("code_commune", insee.to_string()));
        query.extend(param_ids.iter().map(|id| ("code_parametre", id.clone())));
        query.push(("size", self.page_size.to_string()));
        query.push(("order", "desc".to_string()));

        self.fetch_json(&url, &query).await
    }

    async fn fetch_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, UpstreamError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|source| UpstreamError::Request {
                url: url.to_string(),
                source,
            })?;

        let url = response.url().to_string();
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status { url, status });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Request {
                url: url.clone(),
                source,
            })?;

        tracing::debug!(%url, bytes = bytes.len(), "upstream responded");
        serde_json::from_slice(&bytes).map_err(|source| UpstreamError::Decode { url, source })
    }
}
