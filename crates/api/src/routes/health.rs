use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new().route("/healthz", get(healthz))
}

/// Health check endpoint.
async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.snapshots.current().await;
    Json(json!({
        "status": "ok",
        "scheduler": state.scheduler.state().await.to_string(),
        "mode": state.data_mode.to_string(),
        "results": snapshot.len(),
        "last_update": snapshot.generated_at,
    }))
}
