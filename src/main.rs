//! Blog Aggregator — Binary Entrypoint
//! Boots the Axum HTTP server over the aggregation data layer: loads the
//! environment, wires tracing and metrics, and serves the API router.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blog_aggregator::api::{self, AppState};
use blog_aggregator::config::BlogConfig;
use blog_aggregator::metrics::Metrics;
use blog_aggregator::Blog;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("blog_aggregator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the variables come from the host.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = BlogConfig::from_env();
    let metrics = Metrics::init(config.history_years);

    let blog = Arc::new(Blog::new(config));
    let app = api::router(AppState { blog }).merge(metrics.router());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "blog aggregator listening");
    axum::serve(listener, app).await?;

    Ok(())
}
