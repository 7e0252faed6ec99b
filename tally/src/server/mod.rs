use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::error::TallyResult;
use crate::server::route::server_router;
use crate::types::params::ServerParams;

pub mod error;
pub mod route;
pub mod types;

/// Sets up and starts the HTTP server with configured routes.
///
/// Binds the listener first so the returned address is final (`port: 0`
/// gets its OS-assigned port resolved here), then serves from a spawned
/// task. The caller decides how long the process lives.
pub async fn setup_server(config: Arc<Config>) -> TallyResult<SocketAddr> {
    let (api_server_url, listener) = get_server_url(config.server_params()).await;

    let app = server_router(config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Failed to start axum server");
    });

    Ok(api_server_url)
}

async fn get_server_url(server_params: &ServerParams) -> (SocketAddr, tokio::net::TcpListener) {
    let address = format!("{}:{}", server_params.host, server_params.port);
    let listener = tokio::net::TcpListener::bind(address).await.expect("Failed to get listener");
    let api_server_url = listener.local_addr().expect("Unable to bind address to listener.");

    (api_server_url, listener)
}
