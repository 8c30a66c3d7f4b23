//! HTTP router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//! Each workflow route is scoped to one session: `/api/sessions/:id/...`.
//!
//! Layers (outermost → innermost): CORS → request log → cache header →
//! body limit → handler.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints::{bids, chat, dashboard, health, reports, sessions, tender};
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config::MAX_UPLOAD_BYTES;

/// Build the API router. The context decides which model connector
/// handlers use.
pub fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(health::check))
        .route("/sessions", post(sessions::create))
        .route("/sessions/:id", get(sessions::summary).delete(sessions::remove))
        .route("/sessions/:id/reset", post(sessions::reset))
        .route("/sessions/:id/api-key", put(sessions::set_api_key))
        // Step 1
        .route("/sessions/:id/tender", post(tender::upload).get(tender::show))
        .route("/sessions/:id/tender/sample", post(tender::load_sample))
        .route("/sessions/:id/criteria", get(tender::criteria))
        .route("/sessions/:id/criteria/:index", put(tender::update_weight))
        // Step 2
        .route("/sessions/:id/bids", post(bids::upload).get(bids::list))
        .route("/sessions/:id/bids/sample", post(bids::load_sample))
        // Step 3
        .route("/sessions/:id/dashboard", get(dashboard::show))
        .route("/sessions/:id/trade-off", post(dashboard::trade_off))
        // Step 4
        .route("/sessions/:id/reports/executive", get(reports::executive))
        .route("/sessions/:id/reports/comparative", get(reports::comparative))
        .route("/sessions/:id/reports/suppliers/:rank", get(reports::supplier))
        .route("/sessions/:id/exports/rankings", get(reports::rankings_csv))
        .route("/sessions/:id/exports/data", get(reports::data_json))
        // Step 5
        .route(
            "/sessions/:id/chat",
            get(chat::history).post(chat::ask).delete(chat::clear),
        )
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(axum::middleware::from_fn(middleware::request_log::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    Router::new().nest("/api", routes)
}
