//! corral server: application entry point.

use anyhow::Context;
use corral_server::app::{build_router, build_state};
use corral_server::config::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive("corral=info".parse().context("parse log directive")?);
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        response_mode = %config.response_mode,
        "Starting corral server..."
    );

    let state = build_state(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("serve HTTP")?;

    tracing::info!("corral server stopped.");
    Ok(())
}
