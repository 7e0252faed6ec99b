use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;

use crate::config::Config;

pub mod elections;
pub mod operations;
pub mod public;

/// Assembles the complete application router: health, election and
/// operation endpoints, with a JSON-less 404 fallback.
pub fn server_router(config: Arc<Config>) -> Router {
    Router::new()
        .merge(public::public_router())
        .merge(elections::election_router(config.clone()))
        .merge(operations::operation_router(config))
        .fallback(handler_404)
}

pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "The requested resource was not found")
}
