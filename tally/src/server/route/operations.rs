use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, instrument};

use super::super::error::{ElectionRouteError, ElectionRouteResult};
use super::super::types::{DataResponse, OperationHandle, OperationView};
use crate::config::Config;

/// Handles requests for the confirmation state of a submitted transaction.
///
/// This is how callers follow up on a write that answered before its
/// receipt existed. `confirmed` flips to true once the background tracker
/// has seen the transaction mine.
#[instrument(skip(config), fields(tx_handle = %handle))]
async fn handle_operation_status_request(
    Path(OperationHandle { handle }): Path<OperationHandle>,
    State(config): State<Arc<Config>>,
) -> ElectionRouteResult {
    match config.database().get_operation_by_handle(&handle).await {
        Ok(Some(operation)) => Ok(Json(DataResponse::new(OperationView::from(operation))).into_response()),
        Ok(None) => Err(ElectionRouteError::NotFound(format!("no operation found for transaction {handle}"))),
        Err(e) => {
            error!(error = %e, "Operation lookup failed");
            Err(ElectionRouteError::Internal("Failed to fetch operation".to_string()))
        }
    }
}

/// Creates the router for transaction tracking endpoints.
pub fn operation_router(config: Arc<Config>) -> Router {
    Router::new().route("/api/operations/:handle", get(handle_operation_status_request)).with_state(config)
}
