// Calm Tools Library
// Guided breathing and 5-4-3-2-1 grounding exercises, exposed to agents as tools

pub mod bridge;
pub mod error;
pub mod exercise;
pub mod gateway;
pub mod models;
pub mod storage;

use std::path::Path;

use gateway::{CalmServer, GatewayError, ServerHandle};

/// Start the companion server for `data_dir`
///
/// Reads `settings.yaml` from `data_dir`, applies `PORT`, and serves until the
/// returned handle is shut down or dropped.
pub async fn run(data_dir: &Path) -> Result<ServerHandle, GatewayError> {
    let server = CalmServer::from_data_dir(data_dir);
    server.start(None).await
}
