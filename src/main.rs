use tracing_subscriber::EnvFilter;

use calm_tools::gateway::{resolve_data_dir, CalmServer, ServerConfig};

#[tokio::main]
async fn main() {
    let data_dir = resolve_data_dir();
    // Read quietly first: the log filter lives in the config
    let (config, source) = ServerConfig::read(&data_dir);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %data_dir.display(),
        "Calm Tools starting"
    );
    source.report(&ServerConfig::config_path(&data_dir));

    let server = CalmServer::new(config.with_env_overrides(), data_dir);
    let handle = match server.start(None).await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(error = %e, "Failed to start server");
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down gracefully");
    handle.shutdown();
}
