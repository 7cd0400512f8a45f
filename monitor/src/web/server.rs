use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::web::{handlers, AppState};

/// Serve the status API until `cancel` fires
pub async fn start_web_server(state: AppState, cancel: CancellationToken) -> Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Status API running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    info!("Status API stopped");
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::get_service_health))
        .route("/api/monitors", get(handlers::get_all_monitors))
        .route("/api/monitors/{name}", get(handlers::get_monitor))
        .route(
            "/api/notifications/test",
            post(handlers::send_test_notification),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
