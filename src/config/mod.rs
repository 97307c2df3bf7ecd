use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_HUBEAU_BASE: &str = "https://hubeau.eaufrance.fr";
pub const DEFAULT_PATH_COMMUNES: &str = "/api/v1/communes";
pub const DEFAULT_PATH_RESULTATS: &str = "/api/v1/qualite/eau_potable/resultats";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown store backend `{0}` (expected `memory` or `redis`)")]
    UnknownBackend(String),
}

/// 缓存和限流的存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Redis,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "" => Ok(Backend::Memory),
            "redis" => Ok(Backend::Redis),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub hubeau_base: String,
    pub path_communes: String,
    pub path_resultats: String,
    pub cache_ttl_ms: u64,
    pub page_size: u32,
    pub allow_origin: String,
    pub rate_limit_window_ms: u64,
    pub rate_limit_max: u64,
    pub upstream_timeout_ms: u64,
    pub backend: Backend,
    pub redis_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            hubeau_base: DEFAULT_HUBEAU_BASE.into(),
            path_communes: DEFAULT_PATH_COMMUNES.into(),
            path_resultats: DEFAULT_PATH_RESULTATS.into(),
            cache_ttl_ms: 24 * 60 * 60 * 1000,
            page_size: 25,
            allow_origin: "*".into(),
            rate_limit_window_ms: 60_000,
            rate_limit_max: 60,
            upstream_timeout_ms: 5_000,
            backend: Backend::Memory,
            redis_url: "redis://127.0.0.1/".into(),
        }
    }
}

/// 读取环境变量，缺失或无法解析时使用默认值
fn var_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn string_or(name: &str, default: String) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        let backend = match env::var("APW_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.backend,
        };

        Ok(Config {
            server_host: string_or("SERVER_HOST", defaults.server_host),
            server_port: var_or("SERVER_PORT", defaults.server_port),
            hubeau_base: string_or("HUBEAU_BASE", defaults.hubeau_base),
            path_communes: string_or("HUBEAU_PATH_COMMUNES", defaults.path_communes),
            path_resultats: string_or("HUBEAU_PATH_RESULTATS", defaults.path_resultats),
            cache_ttl_ms: var_or("APW_CACHE_TTL_MS", defaults.cache_ttl_ms),
            page_size: var_or("APW_SIZE", defaults.page_size),
            allow_origin: string_or("APW_ALLOW_ORIGIN", defaults.allow_origin),
            rate_limit_window_ms: var_or("APW_RL_WINDOW_MS", defaults.rate_limit_window_ms),
            rate_limit_max: var_or("APW_RL_MAX", defaults.rate_limit_max),
            upstream_timeout_ms: var_or("APW_UPSTREAM_TIMEOUT_MS", defaults.upstream_timeout_ms),
            backend,
            redis_url: string_or("REDIS_URL", defaults.redis_url),
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}
