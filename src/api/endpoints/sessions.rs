//! Session lifecycle: create, inspect, reset, drop, and the per-session
//! model API key.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{lock, ApiContext};
use crate::session::EvaluationSession;

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

/// What a session currently holds. Never echoes the key itself.
#[derive(Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub has_tender: bool,
    pub criteria: usize,
    pub evaluations: usize,
    pub chat_turns: usize,
    pub has_trade_off: bool,
    pub has_api_key: bool,
}

impl SessionSummary {
    pub fn of(session_id: Uuid, session: &EvaluationSession) -> Self {
        Self {
            session_id,
            has_tender: session.tender().is_some(),
            criteria: session.criteria().len(),
            evaluations: session.evaluations().len(),
            chat_turns: session.chat().len(),
            has_trade_off: session.trade_off().is_some(),
            has_api_key: session.has_api_key(),
        }
    }
}

#[derive(Deserialize)]
pub struct ApiKeyRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// `POST /api/sessions`
pub async fn create(
    State(ctx): State<ApiContext>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let session_id = ctx.create_session()?;
    Ok((StatusCode::CREATED, Json(SessionCreated { session_id })))
}

/// `GET /api/sessions/:id`
pub async fn summary(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, ApiError> {
    let session = ctx.session(id)?;
    let guard = lock(&session)?;
    Ok(Json(SessionSummary::of(id, &guard)))
}

/// `DELETE /api/sessions/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.remove_session(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/sessions/:id/reset`: start over; the session key survives.
pub async fn reset(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, ApiError> {
    let session = ctx.session(id)?;
    let mut guard = lock(&session)?;
    guard.reset();
    tracing::info!(session = %id, "Session reset");
    Ok(Json(SessionSummary::of(id, &guard)))
}

/// `PUT /api/sessions/:id/api-key`: a blank or absent key clears it.
pub async fn set_api_key(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApiKeyRequest>,
) -> Result<Json<SessionSummary>, ApiError> {
    let session = ctx.session(id)?;
    let mut guard = lock(&session)?;
    guard.set_api_key(req.api_key);
    tracing::info!(session = %id, has_key = guard.has_api_key(), "Session API key updated");
    Ok(Json(SessionSummary::of(id, &guard)))
}
