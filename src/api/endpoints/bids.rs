//! Step 2: supplier bid batches.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use super::{read_files, run_model};
use crate::api::error::ApiError;
use crate::api::types::{lock, ApiContext};
use crate::models::SupplierEvaluation;
use crate::pipeline::intake::{check_batch_size, evaluate_batch, FileFailure};
use crate::pipeline::structuring::TenderContext;
use crate::ranking::{ranking_rows, RankingRow};
use crate::samples::sample_evaluations;

#[derive(Serialize)]
pub struct BatchResponse {
    pub evaluated: usize,
    pub failures: Vec<FileFailure>,
    pub rankings: Vec<RankingRow>,
}

#[derive(Serialize)]
pub struct BidsResponse {
    pub evaluations: Vec<SupplierEvaluation>,
    pub rankings: Vec<RankingRow>,
}

/// `POST /api/sessions/:id/bids`: multipart field `files`, repeated.
///
/// Files are evaluated one by one; a file that fails is reported in
/// `failures` and the rest continue. The successful evaluations replace
/// whatever the session held before, even when none succeeded.
pub async fn upload(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let session = ctx.session(id)?;
    let documents = read_files(&mut multipart, "files").await?;
    check_batch_size(documents.len())?;

    let (tender_ctx, api_key) = {
        let guard = lock(&session)?;
        let tender = guard
            .tender()
            .ok_or_else(|| ApiError::BadRequest("Upload a tender before submitting bids".into()))?;
        let tender_ctx = TenderContext::new(tender, guard.criteria());
        let api_key = guard.resolve_api_key(ctx.config.api_key.as_deref())?;
        (tender_ctx, api_key)
    };
    tracing::info!(session = %id, files = documents.len(), "Bid batch upload");

    let outcome = run_model(&ctx, api_key, move |analyst| {
        Ok(evaluate_batch(analyst, &tender_ctx, &documents)?)
    })
    .await?;

    let mut guard = lock(&session)?;
    let evaluated = outcome.evaluations.len();
    guard.replace_evaluations(outcome.evaluations);
    Ok(Json(BatchResponse {
        evaluated,
        failures: outcome.failures,
        rankings: ranking_rows(guard.evaluations()),
    }))
}

/// `POST /api/sessions/:id/bids/sample`: load the bundled evaluations.
pub async fn load_sample(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<BatchResponse>, ApiError> {
    let session = ctx.session(id)?;
    let mut guard = lock(&session)?;
    guard.replace_evaluations(sample_evaluations());
    tracing::info!(session = %id, "Sample bids loaded");
    Ok(Json(BatchResponse {
        evaluated: guard.evaluations().len(),
        failures: Vec::new(),
        rankings: ranking_rows(guard.evaluations()),
    }))
}

/// `GET /api/sessions/:id/bids`: evaluations in upload order plus the ranking.
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<BidsResponse>, ApiError> {
    let session = ctx.session(id)?;
    let guard = lock(&session)?;
    Ok(Json(BidsResponse {
        evaluations: guard.evaluations().to_vec(),
        rankings: ranking_rows(guard.evaluations()),
    }))
}
