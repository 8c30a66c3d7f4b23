//! API server lifecycle: bind, spawn the axum server in a background
//! task, and hand back a handle with a shutdown channel.

use std::net::SocketAddr;

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::build_router;
use crate::api::types::ApiContext;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind API server on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Failed to read server address: {0}")]
    LocalAddr(std::io::Error),
}

/// Metadata for a running server.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    pub server_addr: String,
    pub port: u16,
    pub started_at: String,
}

/// Handle to a running API server.
pub struct ApiServer {
    pub info: ServerInfo,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ApiServer {
    /// Ask the server to stop accepting connections. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }

    /// Wait until the server task has finished serving in-flight requests.
    pub async fn stopped(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("API server task failed: {e}");
            }
        }
    }
}

/// Start the API server on `addr` (port 0 picks an ephemeral port).
pub async fn start_server_on(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener.local_addr().map_err(ServerError::LocalAddr)?;

    let app = build_router(ctx);

    let info = ServerInfo {
        server_addr: local.to_string(),
        port: local.port(),
        started_at: chrono::Utc::now().to_rfc3339(),
    };

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(addr = %local, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        info,
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
    })
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;

    use super::*;
    use crate::config::AppConfig;
    use crate::pipeline::structuring::{MockConnector, MockLlmClient};

    fn test_ctx() -> ApiContext {
        let mock = Arc::new(MockLlmClient::new("{}"));
        ApiContext::new(AppConfig::default(), Arc::new(MockConnector::new(mock)))
    }

    fn loopback() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    #[tokio::test]
    async fn serves_health_then_stops() {
        let mut server = start_server_on(test_ctx(), loopback())
            .await
            .expect("server should start");
        assert!(server.info.port > 0);
        assert!(!server.info.started_at.is_empty());

        let url = format!("http://127.0.0.1:{}/api/health", server.info.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let url = format!("http://127.0.0.1:{}/nonexistent", server.info.port);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.shutdown();
        server.shutdown();
        server.stopped().await;
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let mut first = start_server_on(test_ctx(), loopback()).await.unwrap();
        let taken: SocketAddr = first.info.server_addr.parse().unwrap();
        let err = start_server_on(test_ctx(), taken).await.err().unwrap();
        assert!(matches!(err, ServerError::Bind { .. }));
        first.shutdown();
    }
}
