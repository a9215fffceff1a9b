//! `POST /mcp` endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use super::methods;
use super::JsonRpcRequest;
use crate::gateway::error::GatewayError;
use crate::gateway::state::GatewayAppState;

/// Session header returned by `initialize`
pub const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";

/// Handle one JSON-RPC message
///
/// The body is taken as text so that non-JSON input is answered with a
/// JSON-RPC parse error rather than an extractor rejection.
pub async fn mcp_post_handler(State(app_state): State<GatewayAppState>, body: String) -> Response {
    app_state.stats.increment_requests();

    let body: Value = match serde_json::from_str(&body) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected non-JSON body");
            let err = GatewayError::Parse(e.to_string());
            return (err.status_code(), Json(err.to_response(None))).into_response();
        }
    };

    let request = match JsonRpcRequest::from_value(&body) {
        Ok(request) => request,
        Err(err) => {
            let id = body.get("id").cloned();
            return (err.status_code(), Json(err.to_response(id))).into_response();
        }
    };

    if request.is_notification() {
        tracing::debug!(method = %request.method, "Notification received");
        return StatusCode::ACCEPTED.into_response();
    }

    if request.method == "initialize" {
        let session_id = Uuid::new_v4().to_string();
        tracing::info!(session_id = %session_id, "MCP session initialized");
        let response = methods::handle_initialize(&request);
        return ([(MCP_SESSION_ID_HEADER, session_id)], Json(response)).into_response();
    }

    Json(methods::dispatch(&app_state, request).await).into_response()
}
