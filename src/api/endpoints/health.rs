//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub sessions: usize,
    pub server_key_configured: bool,
}

/// `GET /api/health`
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        model: ctx.config.model.clone(),
        sessions: ctx.session_count()?,
        server_key_configured: ctx.config.api_key.is_some(),
    }))
}
