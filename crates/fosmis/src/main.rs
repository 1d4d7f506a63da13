mod client;
mod config;
mod results;
mod scrape;
mod server;
mod types;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::client::{ClientConfig, FosmisClient, HtmlCache};
use crate::config::AppConfig;
use crate::types::AppState;

/// How often expired cache entries are swept out.
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Self-ping period; free-tier hosts spin the process down when idle.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(45);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let cache = Arc::new(HtmlCache::with_default_ttl());

    let client = FosmisClient::new(
        ClientConfig {
            base_url: config.fosmis_base_url.clone(),
            ..ClientConfig::default()
        },
        cache.clone(),
    )
    .context("Failed to build portal client")?;

    let port = config.port;
    let run_env = config.run_env.clone();
    let is_dev = config.is_dev();

    let state = Arc::new(AppState {
        config,
        client,
        cache: cache.clone(),
        started_at: Instant::now(),
    });

    spawn_cache_sweeper(cache);
    if !is_dev {
        spawn_keep_alive(port);
    }

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    info!(port, run_env = %run_env, "Server running");

    axum::serve(listener, server::create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server exited with error")?;

    Ok(())
}

fn spawn_cache_sweeper(cache: Arc<HtmlCache>) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(CACHE_SWEEP_INTERVAL);
        loop {
            tick.tick().await;
            let removed = cache.cleanup_expired();
            if removed > 0 {
                debug!(removed, "Evicted expired cache entries");
            }
        }
    });
}

/// Pings our own /health endpoint so free-tier hosting does not idle the
/// process out.
fn spawn_keep_alive(port: u16) {
    tokio::spawn(async move {
        let url = format!("http://localhost:{port}/health");
        info!(url = %url, "Starting keep-alive self-pings");
        let mut tick = tokio::time::interval(KEEP_ALIVE_INTERVAL);
        loop {
            tick.tick().await;
            match reqwest::get(&url).await {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "Keep-alive ping status not OK");
                }
                Ok(_) => {}
                Err(e) => warn!("Keep-alive ping failed: {}", e),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
