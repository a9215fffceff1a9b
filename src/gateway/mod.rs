//! Companion HTTP server
//!
//! Exposes the exercise hub to agents over JSON-RPC at `POST /mcp`.
//! Listens on 127.0.0.1:{port} only.

mod config;
mod error;
mod handlers;
mod resources;
mod server;
mod state;
mod ticker;

pub use config::{resolve_data_dir, ConfigSource, ServerConfig, DATA_DIR_ENV, DEFAULT_PORT, PORT_ENV};
pub use error::GatewayError;
pub use handlers::{JsonRpcRequest, JsonRpcResponse, MCP_SESSION_ID_HEADER};
pub use resources::{UiResource, UI_RESOURCES};
pub use server::{router, CalmServer, ServerHandle};
pub use state::{GatewayAppState, GatewayStats};
pub use ticker::HubTicker;
