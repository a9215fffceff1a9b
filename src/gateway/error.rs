//! Gateway error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::handlers::JsonRpcResponse;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Body is not JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// JSON but not a valid JSON-RPC request
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Server failed to start
    #[error("Server startup failed: {0}")]
    StartupError(String),

    #[error("Port {0} is already in use")]
    PortInUse(u16),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// JSON-RPC error code
    pub fn json_rpc_code(&self) -> i32 {
        match self {
            Self::Parse(_) => -32700,
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::ResourceNotFound(_) => -32002,
            Self::StartupError(_) | Self::PortInUse(_) => -32000,
            Self::ConfigError(_) | Self::Storage(_) | Self::Internal(_) => -32603,
        }
    }

    /// HTTP status for errors returned outside a JSON-RPC envelope
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Parse(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotFound(_) | Self::InvalidParams(_) | Self::ResourceNotFound(_) => {
                StatusCode::OK
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wrap as a JSON-RPC error response for request `id`
    pub fn to_response(&self, id: Option<serde_json::Value>) -> JsonRpcResponse {
        JsonRpcResponse::error(id, self.json_rpc_code(), self.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response(None))).into_response()
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
