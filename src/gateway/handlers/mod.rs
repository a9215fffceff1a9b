//! HTTP request handlers
//!
//! `POST /mcp` JSON-RPC endpoint, `POST /log` and `GET /api/health`.

mod health;
mod mcp;
mod methods;

pub use health::{health_handler, log_handler};
pub use mcp::{mcp_post_handler, MCP_SESSION_ID_HEADER};

use serde::Serialize;
use serde_json::Value;

use super::error::GatewayError;

/// JSON-RPC request
#[derive(Debug, Clone)]
pub struct JsonRpcRequest {
    /// `None` for notifications
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Validate the envelope of a decoded JSON body
    pub fn from_value(body: &Value) -> Result<Self, GatewayError> {
        let Some(object) = body.as_object() else {
            return Err(GatewayError::InvalidRequest(
                "request must be a JSON object".to_string(),
            ));
        };

        if object.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            return Err(GatewayError::InvalidRequest(
                "jsonrpc must be \"2.0\"".to_string(),
            ));
        }

        let method = object
            .get("method")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::InvalidRequest("missing method".to_string()))?;

        Ok(Self {
            id: object.get("id").cloned(),
            method: method.to_string(),
            params: object.get("params").cloned(),
        })
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// String parameter `key`, or an invalid-params error
    pub fn str_param(&self, key: &str) -> Result<&str, GatewayError> {
        self.params
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::InvalidParams(format!("missing string parameter '{}'", key)))
    }
}

/// JSON-RPC response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }

    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        GatewayError::MethodNotFound(method.to_string()).to_response(id)
    }
}

#[cfg(test)]
mod tests;
