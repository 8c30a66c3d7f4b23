//! Step 3: ranked dashboard and the trade-off narrative.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use super::run_model;
use crate::api::error::ApiError;
use crate::api::types::{lock, ApiContext};
use crate::ranking::{dashboard, trade_off_summary, Dashboard};

#[derive(Serialize)]
pub struct DashboardResponse {
    pub tender_title: Option<String>,
    #[serde(flatten)]
    pub dashboard: Dashboard,
    pub trade_off: Option<String>,
}

#[derive(Serialize)]
pub struct TradeOffResponse {
    pub analysis: String,
    /// False when the bids changed while the model was answering; the
    /// narrative is returned but not kept for the comparative report.
    pub stored: bool,
}

/// `GET /api/sessions/:id/dashboard`
pub async fn show(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let session = ctx.session(id)?;
    let guard = lock(&session)?;
    Ok(Json(DashboardResponse {
        tender_title: guard.tender().map(|t| t.title.clone()),
        dashboard: dashboard(guard.evaluations(), guard.criteria()),
        trade_off: guard.trade_off().map(str::to_string),
    }))
}

/// `POST /api/sessions/:id/trade-off`: one model call over the top three.
pub async fn trade_off(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<TradeOffResponse>, ApiError> {
    let session = ctx.session(id)?;
    let (title, leaders, api_key, revision) = {
        let guard = lock(&session)?;
        if guard.evaluations().is_empty() {
            return Err(ApiError::BadRequest("No evaluated bids to compare".into()));
        }
        let title = guard.tender().map(|t| t.title.clone()).unwrap_or_default();
        let api_key = guard.resolve_api_key(ctx.config.api_key.as_deref())?;
        (title, trade_off_summary(guard.evaluations()), api_key, guard.revision())
    };

    let analysis = run_model(&ctx, api_key, move |analyst| {
        Ok(analyst.trade_off_analysis(&title, &leaders)?)
    })
    .await?;

    let stored = lock(&session)?.set_trade_off_at(revision, analysis.clone());
    if stored {
        tracing::info!(session = %id, chars = analysis.len(), "Trade-off analysis stored");
    } else {
        tracing::warn!(session = %id, "Evaluations changed during trade-off analysis; result not stored");
    }
    Ok(Json(TradeOffResponse { analysis, stored }))
}
