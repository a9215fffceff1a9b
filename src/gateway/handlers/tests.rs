use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;
use tokio::sync::Mutex;

use super::*;
use crate::bridge::{
    AgentInteraction, ExerciseHub, HubServices, LogEventSink, PublishedTools, ToolName, ToolResult,
};
use crate::exercise::{ManualClock, ManualScheduler};
use crate::gateway::state::GatewayAppState;
use crate::models::Locale;
use crate::storage::SqliteStore;

#[test]
fn test_json_rpc_response_success() {
    let response = JsonRpcResponse::success(Some(json!(1)), json!({"result": "ok"}));
    assert!(response.result.is_some());
    assert!(response.error.is_none());
    assert_eq!(response.jsonrpc, "2.0");
}

#[test]
fn test_json_rpc_response_error() {
    let response = JsonRpcResponse::error(Some(json!(1)), -32600, "Test error".to_string());
    assert!(response.result.is_none());
    let error = response.error.unwrap();
    assert_eq!(error.code, -32600);
    assert_eq!(error.message, "Test error");
}

#[test]
fn test_request_envelope_validation() {
    let request = JsonRpcRequest::from_value(&json!({
        "jsonrpc": "2.0", "id": 1, "method": "ping"
    }))
    .unwrap();
    assert_eq!(request.method, "ping");
    assert!(!request.is_notification());

    let notification = JsonRpcRequest::from_value(&json!({
        "jsonrpc": "2.0", "method": "notifications/initialized"
    }))
    .unwrap();
    assert!(notification.is_notification());

    let err = JsonRpcRequest::from_value(&json!({ "jsonrpc": "1.0", "id": 1, "method": "ping" }))
        .unwrap_err();
    assert_eq!(err.json_rpc_code(), -32600);

    let err = JsonRpcRequest::from_value(&json!({ "jsonrpc": "2.0", "id": 1 })).unwrap_err();
    assert_eq!(err.json_rpc_code(), -32600);

    let err = JsonRpcRequest::from_value(&json!([1, 2])).unwrap_err();
    assert_eq!(err.json_rpc_code(), -32600);
}

/// App state around a hub driven by a manual clock and scheduler
fn create_test_app_state() -> GatewayAppState {
    let store = SqliteStore::in_memory().unwrap();
    let published = PublishedTools::new();
    let hub = ExerciseHub::new(HubServices {
        clock: Arc::new(ManualClock::new()),
        scheduler: Arc::new(ManualScheduler::new()),
        context: Arc::new(published.clone()),
        events: Arc::new(LogEventSink),
        breath_store: Arc::new(store.clone()),
        grounding_store: Arc::new(store),
        locale: Locale::En,
    });
    GatewayAppState::new(Arc::new(Mutex::new(hub)), published, None)
}

async fn post(state: &GatewayAppState, body: &str) -> Response {
    mcp_post_handler(State(state.clone()), body.to_string()).await
}

async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn rpc(state: &GatewayAppState, method: &str, params: serde_json::Value) -> serde_json::Value {
    let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
    let response = post(state, &body.to_string()).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn test_parse_error_for_non_json_body() {
    let state = create_test_app_state();
    let response = post(&state, "{not json").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], -32700);
    assert!(body["id"].is_null());
}

#[tokio::test]
async fn test_invalid_request_keeps_id() {
    let state = create_test_app_state();
    let response = post(&state, r#"{"jsonrpc":"1.0","id":9,"method":"ping"}"#).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], -32600);
    assert_eq!(body["id"], 9);
}

#[tokio::test]
async fn test_notification_accepted_without_body() {
    let state = create_test_app_state();
    let response = post(&state, r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_initialize_returns_session_header() {
    let state = create_test_app_state();
    let response = post(
        &state,
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let session_id = response
        .headers()
        .get(MCP_SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap();
    assert!(!session_id.is_empty());

    let body = body_json(response).await;
    assert_eq!(body["result"]["protocolVersion"], "2025-03-26");
    assert_eq!(body["result"]["serverInfo"]["name"], "calm-tools");
    assert_eq!(body["result"]["capabilities"]["tools"]["listChanged"], true);
}

#[tokio::test]
async fn test_unknown_method() {
    let state = create_test_app_state();
    let body = rpc(&state, "prompts/list", json!({})).await;
    assert_eq!(body["error"]["code"], -32601);
}

#[tokio::test]
async fn test_tools_list_follows_published_context() {
    let state = create_test_app_state();
    let body = rpc(&state, "tools/list", json!({})).await;
    let names: Vec<&str> = body["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["open_calm", "send_guidance"]);
    assert!(body["result"]["tools"][0]["inputSchema"].is_object());

    rpc(&state, "tools/call", json!({ "name": "open_calm", "arguments": { "exercise": "grounding" } })).await;

    let body = rpc(&state, "tools/list", json!({})).await;
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 4);
    assert_eq!(tools[2]["name"], "start-grounding-session");
}

#[tokio::test]
async fn test_tools_call_runs_on_hub() {
    let state = create_test_app_state();
    rpc(&state, "tools/call", json!({ "name": "open_calm", "arguments": { "exercise": "grounding" } })).await;
    rpc(&state, "tools/call", json!({ "name": "start-grounding-session" })).await;

    let body = rpc(
        &state,
        "tools/call",
        json!({ "name": "submit-grounding-step", "arguments": { "responses": ["desk", "", "", "", ""] } }),
    )
    .await;
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Step 1 recorded."));
    assert!(body["result"].get("isError").is_none());

    let hub = state.hub.lock().await;
    assert_eq!(hub.grounding().status().current_step, Some(1));
}

#[tokio::test]
async fn test_tool_failure_is_a_result_not_an_rpc_error() {
    let state = create_test_app_state();
    let body = rpc(&state, "tools/call", json!({ "name": "finish-breathing" })).await;

    assert!(body.get("error").is_none());
    assert_eq!(body["result"]["isError"], true);
    assert!(body["result"]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Available tools: open_calm, send_guidance"));
}

#[tokio::test]
async fn test_tools_call_without_name() {
    let state = create_test_app_state();
    let body = rpc(&state, "tools/call", json!({ "arguments": {} })).await;
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn test_resources() {
    let state = create_test_app_state();

    let body = rpc(&state, "resources/list", json!({})).await;
    let uris: Vec<&str> = body["result"]["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["uri"].as_str().unwrap())
        .collect();
    assert_eq!(uris, vec!["ui://calm-tools/breath.html", "ui://calm-tools/grounding.html"]);

    let body = rpc(&state, "resources/read", json!({ "uri": "ui://calm-tools/grounding.html" })).await;
    assert_eq!(body["result"]["contents"][0]["mimeType"], "text/html;profile=mcp-app");
    assert!(body["result"]["contents"][0]["text"].as_str().unwrap().contains("<html"));

    let body = rpc(&state, "resources/read", json!({ "uri": "ui://calm-tools/nope.html" })).await;
    assert_eq!(body["error"]["code"], -32002);

    let body = rpc(&state, "resources/read", json!({})).await;
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn test_ping() {
    let state = create_test_app_state();
    let body = rpc(&state, "ping", json!({})).await;
    assert_eq!(body["result"], json!({}));
    assert_eq!(state.stats.total_requests(), 1);
}

/// Interaction scope whose host blows up
struct PanickingInteraction;

impl AgentInteraction for PanickingInteraction {
    fn request_user_interaction(
        &self,
        _tool: ToolName,
        _run: &mut dyn FnMut() -> ToolResult,
    ) -> ToolResult {
        panic!("interaction host crashed");
    }
}

#[tokio::test]
async fn test_handler_panic_is_internal_error() {
    let state = create_test_app_state().with_interaction(Arc::new(PanickingInteraction));

    let body = rpc(
        &state,
        "tools/call",
        json!({ "name": "open_calm", "arguments": { "exercise": "breath" } }),
    )
    .await;
    assert_eq!(body["error"]["code"], -32603);
    assert_eq!(body["id"], 1);

    // The hub lock was released and the server keeps answering
    let body = rpc(&state, "tools/call", json!({ "name": "get-breathing-status" })).await;
    assert!(body.get("error").is_none());
    let body = rpc(&state, "tools/list", json!({})).await;
    assert!(body["result"]["tools"].is_array());
}
