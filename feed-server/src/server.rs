//! Router assembly and server startup.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::routes;
use crate::state::AppState;

/// Build the HTTP router.
///
/// The navigation route is mounted only when the state carries a
/// navigation mailbox, so the fixed-camera server has no such endpoint.
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/login", post(routes::login))
        .route("/video", get(routes::video))
        .route("/locations", get(routes::locations))
        .route("/status", get(routes::status));
    if state.navigation.is_some() {
        router = router.route("/navigate", post(routes::navigate));
    }
    router.with_state(state)
}

/// Serve the application until the process exits.
pub async fn run_server(state: Arc<AppState>, bind_address: &str, port: u16) -> anyhow::Result<()> {
    let navigation = state.navigation.is_some();
    let app = create_router(state);

    let addr: SocketAddr = format!("{bind_address}:{port}")
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {e}"))?;

    info!("Starting server on http://{addr}");
    info!("Login endpoint: POST http://{addr}/login");
    info!("Stream endpoint: http://{addr}/video?token=...");
    info!("Status endpoint: http://{addr}/status");
    if navigation {
        info!("Navigation endpoint: POST http://{addr}/navigate");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {e}"))?;

    Ok(())
}
