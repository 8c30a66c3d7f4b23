//! API error types with structured JSON responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::extraction::ExtractionError;
use crate::pipeline::intake::{DocumentFailure, IntakeError};
use crate::pipeline::structuring::StructuringError;
use crate::report::ReportError;
use crate::session::SessionError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("Document could not be read: {0}")]
    ExtractionFailed(String),
    #[error("Model response could not be parsed: {0}")]
    MalformedResponse(String),
    #[error("Model service error: {0}")]
    RemoteService(String),
    #[error("No model API key configured")]
    MissingCredential,
    #[error("Too many files: {count} submitted, at most {max}")]
    BatchTooLarge { count: usize, max: usize },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::UnsupportedFormat(ext) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                format!("Unsupported file format '{ext}'. Use PDF, DOCX or TXT."),
            ),
            ApiError::ExtractionFailed(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_FAILED",
                detail.clone(),
            ),
            ApiError::MalformedResponse(detail) => (
                StatusCode::BAD_GATEWAY,
                "MALFORMED_RESPONSE",
                format!("The model reply could not be parsed: {detail}"),
            ),
            ApiError::RemoteService(detail) => (
                StatusCode::BAD_GATEWAY,
                "REMOTE_SERVICE",
                detail.clone(),
            ),
            ApiError::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                "MISSING_CREDENTIAL",
                "No model API key. Set one for this session or configure ANTHROPIC_API_KEY."
                    .to_string(),
            ),
            ApiError::BatchTooLarge { count, max } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "BATCH_TOO_LARGE",
                format!("{count} files submitted; at most {max} bids per upload"),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone()),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedFormat(ext) => ApiError::UnsupportedFormat(ext),
            other => ApiError::ExtractionFailed(other.to_string()),
        }
    }
}

impl From<StructuringError> for ApiError {
    fn from(err: StructuringError) -> Self {
        match err {
            StructuringError::MalformedResponse { detail, .. } => ApiError::MalformedResponse(detail),
            StructuringError::RemoteService(detail) => ApiError::RemoteService(detail),
            StructuringError::MissingCredential => ApiError::MissingCredential,
        }
    }
}

impl From<DocumentFailure> for ApiError {
    fn from(err: DocumentFailure) -> Self {
        match err {
            DocumentFailure::Extraction(e) => e.into(),
            DocumentFailure::Structuring(e) => e.into(),
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::BatchTooLarge { count, max } => ApiError::BatchTooLarge { count, max },
            IntakeError::EmptyBatch => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::CriterionOutOfRange { .. } => ApiError::NotFound(err.to_string()),
            SessionError::WeightOutOfRange(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Malformed upload: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn code_of(err: ApiError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json["error"]["code"].as_str().unwrap_or_default().to_string())
    }

    #[tokio::test]
    async fn status_and_code_mapping() {
        let cases = [
            (ApiError::UnsupportedFormat("xls".into()), StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FORMAT"),
            (ApiError::ExtractionFailed("bad pdf".into()), StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED"),
            (ApiError::MalformedResponse("no braces".into()), StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE"),
            (ApiError::RemoteService("overloaded".into()), StatusCode::BAD_GATEWAY, "REMOTE_SERVICE"),
            (ApiError::MissingCredential, StatusCode::UNAUTHORIZED, "MISSING_CREDENTIAL"),
            (ApiError::BatchTooLarge { count: 11, max: 10 }, StatusCode::PAYLOAD_TOO_LARGE, "BATCH_TOO_LARGE"),
            (ApiError::NotFound("session".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (ApiError::BadRequest("empty".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        ];
        for (err, status, code) in cases {
            assert_eq!(code_of(err).await, (status, code.to_string()));
        }
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let response = ApiError::Internal("lock poisoned".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[test]
    fn domain_errors_convert() {
        assert!(matches!(
            ApiError::from(ExtractionError::UnsupportedFormat("xls".into())),
            ApiError::UnsupportedFormat(_)
        ));
        assert!(matches!(
            ApiError::from(ExtractionError::Parse { format: "pdf", detail: "eof".into() }),
            ApiError::ExtractionFailed(_)
        ));
        assert!(matches!(
            ApiError::from(StructuringError::MissingCredential),
            ApiError::MissingCredential
        ));
        assert!(matches!(
            ApiError::from(IntakeError::BatchTooLarge { count: 12, max: 10 }),
            ApiError::BatchTooLarge { count: 12, max: 10 }
        ));
        assert!(matches!(ApiError::from(IntakeError::EmptyBatch), ApiError::BadRequest(_)));
        assert!(matches!(
            ApiError::from(SessionError::CriterionOutOfRange { index: 9, len: 2 }),
            ApiError::NotFound(_)
        ));
    }
}
