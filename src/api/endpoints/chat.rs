//! Step 5: questions over the evaluation data.
//!
//! - `GET /api/sessions/:id/chat`: transcript
//! - `POST /api/sessions/:id/chat`: ask; the exchange is appended only on success
//! - `DELETE /api/sessions/:id/chat`: clear the transcript

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::run_model;
use crate::api::error::ApiError;
use crate::api::types::{lock, ApiContext};
use crate::models::ChatTurn;

/// Longest question accepted.
const MAX_QUESTION_CHARS: usize = 4000;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Serialize)]
pub struct ChatHistory {
    pub history: Vec<ChatTurn>,
}

#[derive(Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub history: Vec<ChatTurn>,
}

pub async fn history(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatHistory>, ApiError> {
    let session = ctx.session(id)?;
    let guard = lock(&session)?;
    Ok(Json(ChatHistory {
        history: guard.chat().to_vec(),
    }))
}

pub async fn ask(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatAnswer>, ApiError> {
    let question = req.question.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::BadRequest("Question cannot be empty".into()));
    }
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Question too long (max {MAX_QUESTION_CHARS} chars)"
        )));
    }

    let session = ctx.session(id)?;
    let (tender, evaluations, criteria, history, api_key) = {
        let guard = lock(&session)?;
        (
            guard.tender().cloned(),
            guard.evaluations().to_vec(),
            guard.criteria().to_vec(),
            guard.chat().to_vec(),
            guard.resolve_api_key(ctx.config.api_key.as_deref())?,
        )
    };

    let asked = question.clone();
    let answer = run_model(&ctx, api_key, move |analyst| {
        Ok(analyst.answer_question(&asked, tender.as_ref(), &evaluations, &criteria, &history)?)
    })
    .await?;

    let mut guard = lock(&session)?;
    guard.append_exchange(&question, &answer);
    tracing::info!(session = %id, turns = guard.chat().len(), "Chat exchange recorded");
    Ok(Json(ChatAnswer {
        answer,
        history: guard.chat().to_vec(),
    }))
}

pub async fn clear(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = ctx.session(id)?;
    lock(&session)?.clear_chat();
    Ok(StatusCode::NO_CONTENT)
}
