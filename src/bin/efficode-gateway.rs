//! Efficode Gateway Binary
//!
//! Standalone HTTP service exposing the codec: encode, decode, compress,
//! decompress, message exchange and self-extracting bundles.

use anyhow::Context;
use efficode::{
    api::{build_router, AppState},
    config::Config,
    observability::init_observability,
};
use std::{net::SocketAddr, path::Path};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration from file, falling back to defaults
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let config_found = Path::new(&config_path).exists();
    let config = Config::from_file_with_env(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;

    init_observability(&config.logging.level, &config.logging.format);

    info!("Starting Efficode Gateway");
    if config_found {
        info!("Configuration loaded and validated from {}", config_path);
    } else {
        warn!("{} not found, using defaults and environment overrides", config_path);
    }
    info!(
        threshold = config.codec.compression_threshold,
        max_message_size_kb = config.codec.max_message_size_kb,
        "Codec initialized"
    );

    let app_state = AppState::from_config(&config.codec);
    let app = build_router(app_state, &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    info!("Server listening on {}", addr);

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }

    info!("Starting graceful shutdown");
}
