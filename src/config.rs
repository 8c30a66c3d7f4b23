use std::net::SocketAddr;

/// Application-level constants
pub const APP_NAME: &str = "bideval";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Model used for every extraction, evaluation and narrative call.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
/// Remote model calls can run for minutes on large bids.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// Output ceiling for tender extraction and bid evaluation.
pub const STRUCTURED_MAX_TOKENS: u32 = 4096;
/// Output ceiling for trade-off and chat narratives.
pub const NARRATIVE_MAX_TOKENS: u32 = 2048;

/// Bid batches above this count are rejected outright.
pub const MAX_BATCH_FILES: usize = 10;
/// Upper bound for one multipart request (ten bids plus overhead).
pub const MAX_UPLOAD_BYTES: usize = 110 * 1024 * 1024;

pub const ENV_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_BIND_ADDR: &str = "BIDEVAL_BIND_ADDR";
pub const ENV_MODEL: &str = "BIDEVAL_MODEL";
pub const ENV_API_BASE: &str = "BIDEVAL_API_BASE";
pub const ENV_HTTP_TIMEOUT: &str = "BIDEVAL_HTTP_TIMEOUT_SECS";

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "bideval_lib=info,bideval=info,tower_http=warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Runtime configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub model: String,
    pub api_base: String,
    pub http_timeout_secs: u64,
    /// Process-wide key; a session may override it.
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_raw = non_empty(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                var: ENV_BIND_ADDR,
                value: bind_raw.clone(),
            })?;

        let http_timeout_secs = match non_empty(ENV_HTTP_TIMEOUT) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: ENV_HTTP_TIMEOUT,
                    value: raw,
                })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr,
            model: non_empty(ENV_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: non_empty(ENV_API_BASE)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            http_timeout_secs,
            api_key: non_empty(ENV_API_KEY).map(|k| k.trim().to_string()),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            api_key: None,
        }
    }
}
