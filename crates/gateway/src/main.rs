use anyhow::Context;
use lotline_gateway::{create_router, telemetry, AppState, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();
    telemetry::init();

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    let bind_address = config.bind_address.clone();
    tracing::info!(
        backend = %config.backend_url,
        master_hosts = ?config.master_hosts.iter().collect::<Vec<_>>(),
        secure_cookies = config.secure_cookies,
        "Starting Lotline gateway"
    );

    let state = AppState::new(config).context("failed to build backend client")?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!("Listening on {}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        // Keep serving rather than exit on a broken signal handler
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
