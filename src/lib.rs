pub mod api;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod samples;
pub mod session;

use tracing_subscriber::EnvFilter;

use crate::api::{start_server_on, ApiContext, ServerError};
use crate::config::{AppConfig, ConfigError};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Serve the API until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    if config.api_key.is_none() {
        tracing::warn!(
            "{} not set; each session must supply its own API key",
            config::ENV_API_KEY
        );
    }
    tracing::info!(
        model = %config.model,
        api_base = %config.api_base,
        timeout_secs = config.http_timeout_secs,
        "Model endpoint configured"
    );

    let bind_addr = config.bind_addr;
    let mut server = start_server_on(ApiContext::from_config(config), bind_addr).await?;
    tracing::info!(addr = %server.info.server_addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.stopped().await;
    Ok(())
}
