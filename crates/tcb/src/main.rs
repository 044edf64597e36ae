use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use tcb_core::{config::Config, health::HealthServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tcb_core::logging::init("tcb")?;

    let cfg = Arc::new(Config::load()?);

    let shutdown = CancellationToken::new();
    let health = if cfg.health_enabled {
        let server = HealthServer::bind(cfg.health_addr)
            .await
            .with_context(|| format!("failed to bind health endpoint on {}", cfg.health_addr))?;
        Some(tokio::spawn(server.serve(shutdown.clone())))
    } else {
        None
    };

    let polled = tcb_telegram::router::run_polling(cfg).await;

    shutdown.cancel();
    if let Some(task) = health {
        match task.await {
            Ok(Err(e)) => tracing::warn!(error = %e, "health endpoint failed"),
            Err(e) => tracing::warn!(error = %e, "health task panicked"),
            Ok(Ok(())) => {}
        }
    }

    polled.context("telegram bot failed")?;
    tracing::info!("bot stopped");
    Ok(())
}
