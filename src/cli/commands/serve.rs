use anyhow::Context;

use crate::config::AppConfig;
use crate::routes;
use crate::state::AppState;

pub async fn handle(mut config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.http.port = port;
    }

    tracing::info!(
        environment = %config.environment,
        issuer = %config.security.jwt.issuer,
        audience = %config.security.jwt.audience,
        "Starting FileBuddy API"
    );

    let bind_addr = format!("0.0.0.0:{}", config.http.port);
    let state = AppState::from_config(config).context("invalid security configuration")?;
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
