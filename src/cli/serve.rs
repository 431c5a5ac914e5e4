//! `serve` subcommand: run the prediction API until interrupted

use std::path::Path;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::cli::logging::init_tracing;
use crate::server::{create_router, AppState};

async fn wait_for_shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

pub fn run_serve(host: &str, port: u16, model: &Path, analytics: &Path, plots_dir: &Path) -> Result<()> {
    init_tracing("info");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async {
        let state = AppState::load(model, analytics, plots_dir);
        let app = create_router(state);

        let bind_addr = format!("{host}:{port}");
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to bind {bind_addr}"))?;
        info!("vinoveritas listening on http://{bind_addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown_signal())
            .await
            .context("Server failed")
    })
}
