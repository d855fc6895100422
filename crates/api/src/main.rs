//! OrderBridge server entry point

use std::sync::Arc;

use anyhow::Context as _;
use orderbridge_server::{build_router, AppContext};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => info!(error = %e, "No .env file loaded"),
    }

    let config = orderbridge_infra::config::load().context("configuration")?;
    let bind_addr = config.server.bind_addr.clone();
    let sync_enabled = config.sync.enabled;

    let ctx = Arc::new(AppContext::new(config).context("application wiring")?);

    let mut worker = ctx.sync_worker();
    if sync_enabled {
        worker.start().await.context("sync worker start")?;
    } else {
        info!("Sync worker disabled by configuration");
    }

    let app = build_router(Arc::clone(&ctx));
    let listener =
        tokio::net::TcpListener::bind(&bind_addr).await.context("binding listen address")?;
    info!(addr = %bind_addr, "OrderBridge listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await
        .context("server")?;

    if worker.is_running() {
        if let Err(e) = worker.stop().await {
            warn!(error = %e, "Sync worker did not stop cleanly");
        }
    }

    info!("OrderBridge stopped");
    Ok(())
}
