use axum::routing::get;
use axum::Router;

pub(super) fn public_router() -> Router {
    Router::new().route("/health", get(handle_health_request))
}

async fn handle_health_request() -> &'static str {
    "UP"
}
