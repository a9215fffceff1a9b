//! JSON-RPC method handlers

use serde_json::{json, Value};

use super::{JsonRpcRequest, JsonRpcResponse};
use crate::gateway::error::GatewayError;
use crate::gateway::resources::{find_resource, read_resource, UI_RESOURCES};
use crate::gateway::state::GatewayAppState;

/// Protocol version announced by `initialize`
pub const PROTOCOL_VERSION: &str = "2025-03-26";

pub(super) async fn dispatch(app_state: &GatewayAppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id.clone();
    let result = match request.method.as_str() {
        "ping" => Ok(json!({})),
        "tools/list" => Ok(handle_tools_list(app_state)),
        "tools/call" => handle_tools_call(app_state, &request).await,
        "resources/list" => Ok(json!({ "resources": UI_RESOURCES })),
        "resources/read" => handle_resources_read(app_state, &request),
        other => {
            tracing::debug!(method = other, "Unknown method");
            return JsonRpcResponse::method_not_found(id, other);
        }
    };

    match result {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(err) => err.to_response(id),
    }
}

pub(super) fn handle_initialize(request: &JsonRpcRequest) -> JsonRpcResponse {
    JsonRpcResponse::success(
        request.id.clone(),
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": true },
                "resources": {}
            },
            "serverInfo": {
                "name": "calm-tools",
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

fn handle_tools_list(app_state: &GatewayAppState) -> Value {
    json!({ "tools": app_state.published.descriptors() })
}

/// Run a tool on the hub
///
/// Tool-level failures come back as `isError` results; only a handler
/// panic turns into a JSON-RPC internal error.
async fn handle_tools_call(
    app_state: &GatewayAppState,
    request: &JsonRpcRequest,
) -> Result<Value, GatewayError> {
    let name = request.str_param("name")?.to_string();
    let arguments = request
        .params
        .as_ref()
        .and_then(|p| p.get("arguments"))
        .cloned()
        .unwrap_or(Value::Null);

    app_state.stats.increment_tool_calls();
    tracing::info!(tool = %name, "Tool call");

    let hub = app_state.hub.clone();
    let interaction = app_state.interaction.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut hub = hub.blocking_lock();
        hub.call_tool(&name, arguments, interaction.as_ref())
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Tool handler failed");
        GatewayError::Internal(format!("Tool handler failed: {}", e))
    })?;

    serde_json::to_value(&result).map_err(|e| GatewayError::Internal(e.to_string()))
}

fn handle_resources_read(
    app_state: &GatewayAppState,
    request: &JsonRpcRequest,
) -> Result<Value, GatewayError> {
    let uri = request.str_param("uri")?;
    let resource =
        find_resource(uri).ok_or_else(|| GatewayError::ResourceNotFound(uri.to_string()))?;
    let text = read_resource(resource, app_state.ui_dir.as_deref())?;

    Ok(json!({
        "contents": [{
            "uri": resource.uri,
            "mimeType": resource.mime_type,
            "text": text
        }]
    }))
}
