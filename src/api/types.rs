//! Shared types for the HTTP layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::api::error::ApiError;
use crate::config::AppConfig;
use crate::pipeline::structuring::{AnthropicConnector, LlmConnector};
use crate::session::EvaluationSession;

pub type SharedSession = Arc<Mutex<EvaluationSession>>;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes and middleware.
///
/// Sessions are independent: each browser tab or client creates its own
/// and every operation names it in the path.
#[derive(Clone)]
pub struct ApiContext {
    pub sessions: Arc<Mutex<HashMap<Uuid, SharedSession>>>,
    pub connector: Arc<dyn LlmConnector>,
    pub config: Arc<AppConfig>,
}

impl ApiContext {
    pub fn new(config: AppConfig, connector: Arc<dyn LlmConnector>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            connector,
            config: Arc::new(config),
        }
    }

    /// Context talking to the configured Anthropic endpoint.
    pub fn from_config(config: AppConfig) -> Self {
        let connector = AnthropicConnector::new(&config.api_base, config.http_timeout_secs);
        Self::new(config, Arc::new(connector))
    }

    fn registry(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SharedSession>>, ApiError> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::Internal("session registry lock poisoned".into()))
    }

    pub fn create_session(&self) -> Result<Uuid, ApiError> {
        let id = Uuid::new_v4();
        self.registry()?
            .insert(id, Arc::new(Mutex::new(EvaluationSession::new())));
        tracing::info!(session = %id, "Session created");
        Ok(id)
    }

    pub fn session(&self, id: Uuid) -> Result<SharedSession, ApiError> {
        self.registry()?
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Session {id} not found")))
    }

    pub fn remove_session(&self, id: Uuid) -> Result<(), ApiError> {
        match self.registry()?.remove(&id) {
            Some(_) => {
                tracing::info!(session = %id, "Session removed");
                Ok(())
            }
            None => Err(ApiError::NotFound(format!("Session {id} not found"))),
        }
    }

    pub fn session_count(&self) -> Result<usize, ApiError> {
        Ok(self.registry()?.len())
    }
}

/// Lock one session. Never hold the guard across an `.await`.
pub fn lock(session: &SharedSession) -> Result<MutexGuard<'_, EvaluationSession>, ApiError> {
    session
        .lock()
        .map_err(|_| ApiError::Internal("session lock poisoned".into()))
}
