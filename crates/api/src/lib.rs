pub mod routes;

use std::net::SocketAddr;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use common::{DataMode, Result};
use engine::SchedulerHandle;
use signals::SnapshotReader;

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    /// Read-only view of the last published snapshot.
    pub snapshots: SnapshotReader,
    pub scheduler: SchedulerHandle,
    pub data_mode: DataMode,
}

/// All dashboard routes with their layers applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::api_router())
        .merge(routes::health_router())
        .merge(routes::dashboard_router())
        .with_state(state)
        .layer(cors)
        .layer(CompressionLayer::new())
}

/// Build and run the Axum dashboard server.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Dashboard listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
