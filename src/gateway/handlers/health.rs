//! Health check and UI log endpoints

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::Value;

use crate::gateway::state::GatewayAppState;

/// GET /api/health
pub async fn health_handler(State(app_state): State<GatewayAppState>) -> impl IntoResponse {
    let live_exercise = app_state.hub.lock().await.live_exercise();

    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "liveExercise": live_exercise,
        "stats": {
            "totalRequests": app_state.stats.total_requests(),
            "toolCalls": app_state.stats.tool_calls()
        }
    }))
}

/// POST /log - diagnostics forwarded by the UI
pub async fn log_handler(Json(body): Json<Value>) -> impl IntoResponse {
    tracing::info!(target: "calm_tools::ui", payload = %body, "UI log");
    Json(serde_json::json!({ "ok": true }))
}
