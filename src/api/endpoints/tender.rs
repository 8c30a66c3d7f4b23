//! Step 1: tender upload and the criteria weights derived from it.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{read_files, run_model};
use crate::api::error::ApiError;
use crate::api::types::{lock, ApiContext};
use crate::models::{CriterionRecord, TenderRecord};
use crate::pipeline::extraction::DocumentFormat;
use crate::pipeline::intake::process_tender;
use crate::ranking::{weight_summary, WeightSummary};
use crate::samples::sample_tender;
use crate::session::EvaluationSession;

#[derive(Serialize)]
pub struct TenderResponse {
    pub tender: Option<TenderRecord>,
    pub criteria: Vec<CriterionRecord>,
    pub weights: WeightSummary,
}

impl TenderResponse {
    fn of(session: &EvaluationSession) -> Self {
        Self {
            tender: session.tender().cloned(),
            criteria: session.criteria().to_vec(),
            weights: weight_summary(session.criteria()),
        }
    }
}

#[derive(Serialize)]
pub struct CriteriaResponse {
    pub criteria: Vec<CriterionRecord>,
    pub weights: WeightSummary,
}

impl CriteriaResponse {
    fn of(session: &EvaluationSession) -> Self {
        Self {
            criteria: session.criteria().to_vec(),
            weights: weight_summary(session.criteria()),
        }
    }
}

#[derive(Deserialize)]
pub struct WeightUpdate {
    pub weight: u32,
}

/// `POST /api/sessions/:id/tender`: multipart field `file`.
///
/// On any failure the previous tender stays in place.
pub async fn upload(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<TenderResponse>, ApiError> {
    let session = ctx.session(id)?;
    let mut files = read_files(&mut multipart, "file").await?;
    if files.len() != 1 {
        return Err(ApiError::BadRequest(format!(
            "Expected one tender file in field 'file', got {}",
            files.len()
        )));
    }
    let document = files.remove(0);
    DocumentFormat::from_file_name(&document.file_name)?;

    let api_key = lock(&session)?.resolve_api_key(ctx.config.api_key.as_deref())?;
    tracing::info!(session = %id, file = %document.file_name, bytes = document.bytes.len(), "Tender upload");

    let tender = run_model(&ctx, api_key, move |analyst| {
        Ok(process_tender(analyst, &document)?)
    })
    .await?;

    let mut guard = lock(&session)?;
    guard.set_tender(tender);
    Ok(Json(TenderResponse::of(&guard)))
}

/// `POST /api/sessions/:id/tender/sample`: load the bundled tender.
pub async fn load_sample(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<TenderResponse>, ApiError> {
    let session = ctx.session(id)?;
    let mut guard = lock(&session)?;
    guard.set_tender(sample_tender());
    tracing::info!(session = %id, "Sample tender loaded");
    Ok(Json(TenderResponse::of(&guard)))
}

/// `GET /api/sessions/:id/tender`
pub async fn show(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<TenderResponse>, ApiError> {
    let session = ctx.session(id)?;
    let guard = lock(&session)?;
    Ok(Json(TenderResponse::of(&guard)))
}

/// `GET /api/sessions/:id/criteria`
pub async fn criteria(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<CriteriaResponse>, ApiError> {
    let session = ctx.session(id)?;
    let guard = lock(&session)?;
    Ok(Json(CriteriaResponse::of(&guard)))
}

/// `PUT /api/sessions/:id/criteria/:index`: body `{"weight": n}`.
/// The other weights are left as they are.
pub async fn update_weight(
    State(ctx): State<ApiContext>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(req): Json<WeightUpdate>,
) -> Result<Json<CriteriaResponse>, ApiError> {
    let session = ctx.session(id)?;
    let mut guard = lock(&session)?;
    guard.set_criterion_weight(index, req.weight)?;
    Ok(Json(CriteriaResponse::of(&guard)))
}
