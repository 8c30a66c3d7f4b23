//! Step 4: downloadable reports and exports, generated on request and
//! never stored.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{lock, ApiContext};
use crate::models::{SupplierEvaluation, TenderRecord};
use crate::ranking::rank;
use crate::report;

const PDF: &str = "application/pdf";
const CSV: &str = "text/csv; charset=utf-8";
const JSON: &str = "application/json";

fn attachment(bytes: Vec<u8>, content_type: &str, file_name: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .header(header::CACHE_CONTROL, "no-cache, no-store")
        .body(Body::from(bytes))
        .unwrap_or_else(|_| {
            (StatusCode::INTERNAL_SERVER_ERROR, "Response build failed").into_response()
        })
}

fn stamp(generated_at: DateTime<Utc>) -> String {
    generated_at.format("%Y%m%d_%H%M").to_string()
}

/// Tender and evaluations copied out so rendering runs unlocked.
fn snapshot(
    ctx: &ApiContext,
    id: Uuid,
) -> Result<(Option<TenderRecord>, Vec<SupplierEvaluation>, Option<String>), ApiError> {
    let session = ctx.session(id)?;
    let guard = lock(&session)?;
    Ok((
        guard.tender().cloned(),
        guard.evaluations().to_vec(),
        guard.trade_off().map(str::to_string),
    ))
}

/// `GET /api/sessions/:id/reports/executive`
pub async fn executive(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (tender, evaluations, _) = snapshot(&ctx, id)?;
    let now = Utc::now();
    let bytes = report::generate_executive_summary(tender.as_ref(), &evaluations, now)?;
    Ok(attachment(bytes, PDF, &format!("executive_summary_{}.pdf", stamp(now))))
}

/// `GET /api/sessions/:id/reports/comparative`
pub async fn comparative(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (tender, evaluations, trade_off) = snapshot(&ctx, id)?;
    let now = Utc::now();
    let bytes = report::generate_comparative_report(
        tender.as_ref(),
        &evaluations,
        trade_off.as_deref(),
        now,
    )?;
    Ok(attachment(bytes, PDF, &format!("comparative_analysis_{}.pdf", stamp(now))))
}

/// `GET /api/sessions/:id/reports/suppliers/:rank`: 1-based rank.
pub async fn supplier(
    State(ctx): State<ApiContext>,
    Path((id, position)): Path<(Uuid, usize)>,
) -> Result<Response, ApiError> {
    let (tender, evaluations, _) = snapshot(&ctx, id)?;
    let ranked = rank(&evaluations);
    let evaluation = position
        .checked_sub(1)
        .and_then(|i| ranked.get(i))
        .ok_or_else(|| {
            ApiError::NotFound(format!("No supplier at rank {position} ({} ranked)", ranked.len()))
        })?;

    let now = Utc::now();
    let bytes = report::generate_supplier_report(tender.as_ref(), evaluation, position, now)?;
    Ok(attachment(bytes, PDF, &format!("supplier_{position}_{}.pdf", stamp(now))))
}

/// `GET /api/sessions/:id/exports/rankings`
pub async fn rankings_csv(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (_, evaluations, _) = snapshot(&ctx, id)?;
    let csv = report::rankings_csv(&evaluations)?;
    let name = format!("supplier_rankings_{}.csv", stamp(Utc::now()));
    Ok(attachment(csv.into_bytes(), CSV, &name))
}

/// `GET /api/sessions/:id/exports/data`: the whole session as JSON.
pub async fn data_json(
    State(ctx): State<ApiContext>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let session = ctx.session(id)?;
    let now = Utc::now();
    let json = {
        let guard = lock(&session)?;
        report::store_json(&guard, now)?
    };
    Ok(attachment(json.into_bytes(), JSON, &format!("evaluation_data_{}.json", stamp(now))))
}
