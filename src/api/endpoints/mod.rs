//! API endpoint handlers, one module per workflow step.
//!
//! Handlers copy what they need out of the session, release the lock,
//! run blocking work on the blocking pool, then write results back.

pub mod bids;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod reports;
pub mod sessions;
pub mod tender;

use std::sync::Arc;

use axum::extract::Multipart;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::intake::UploadedDocument;
use crate::pipeline::structuring::BidAnalyst;

/// Collect every file sent under `field_name`, in upload order.
pub(crate) async fn read_files(
    multipart: &mut Multipart,
    field_name: &str,
) -> Result<Vec<UploadedDocument>, ApiError> {
    let mut documents = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("document").to_string();
        let bytes = field.bytes().await?;
        documents.push(UploadedDocument::new(file_name, bytes.to_vec()));
    }
    Ok(documents)
}

/// Run `op` against a model client on the blocking pool.
///
/// The client is built and dropped on that thread; the blocking HTTP
/// client must stay off the async runtime.
pub(crate) async fn run_model<T, F>(ctx: &ApiContext, api_key: String, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&BidAnalyst) -> Result<T, ApiError> + Send + 'static,
{
    let connector = Arc::clone(&ctx.connector);
    let model = ctx.config.model.clone();

    tokio::task::spawn_blocking(move || {
        let client = connector.connect(&api_key)?;
        let analyst = BidAnalyst::new(client, &model);
        op(&analyst)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Model task failed: {e}")))?
}
