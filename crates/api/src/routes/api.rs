use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use serde_json::{json, Value};
use tracing::warn;

use common::Snapshot;

use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/signals", get(get_signals))
        .route("/api/refresh", post(post_refresh))
}

// ─── Signals ──────────────────────────────────────────────────────────────────

async fn get_signals(State(state): State<AppState>) -> Json<Snapshot> {
    let snapshot = state.snapshots.current().await;
    Json(Snapshot::clone(&snapshot))
}

// ─── Refresh ──────────────────────────────────────────────────────────────────

/// Queue an out-of-cycle refresh. The new snapshot is published once the
/// scheduler has run it; poll `/api/signals` for the result.
async fn post_refresh(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.scheduler.refresh_now().await {
        (StatusCode::ACCEPTED, Json(json!({ "status": "queued" })))
    } else {
        warn!("Refresh requested but scheduler is not running");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "scheduler not running" })),
        )
    }
}
