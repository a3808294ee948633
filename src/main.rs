// rategate - In-memory rate limiting and TTL response caching for AI-heavy API routes

use anyhow::Result;
use clap::Parser;
use rategate::cli::Args;
use rategate::config::AppConfig;
use rategate::server::{create_router, AppState};
use rategate::utils::logging;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let config = AppConfig::load(args.config.as_deref())?;

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting rategate v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build application state (validates the quota rule table)
    info!(
        "Registering {} rate policies, 5 cache domains",
        config.limiter.rules.len()
    );
    let state = AppState::from_config(config.clone())?;

    // Phase 4: Start background sweepers
    state.spawn_sweepers();

    // Phase 5: Build and start HTTP server
    let app = create_router(state);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 6: Run server with graceful shutdown. Connect info feeds the
    // peer-address fallback of client_ip keyed endpoints.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shut down gracefully");
    Ok(())
}

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
            info!("Received SIGTERM signal");
        },
    }
}
