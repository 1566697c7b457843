mod config;
mod errors;
mod handlers;
mod metrics;
mod models;
mod rate_limit;
mod router;
mod state;
mod upstream;
mod validation;

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Args;
use crate::rate_limit::TokenBucketLimiter;
use crate::router::build_router;
use crate::state::AppState;
use crate::upstream::GeminiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional, real env vars win
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let limits = args.text_limits()?;

    let upstream = GeminiClient::new(&args.upstream_url, args.api_key.clone(), args.upstream_timeout())
        .context("failed to build upstream HTTP client")?;
    if !upstream.is_configured() {
        // not fatal, every request will answer 500 until it is set
        warn!("API_KEY is not set, text enhancement requests will fail");
    }

    let state = Arc::new(AppState {
        limiter: Arc::new(TokenBucketLimiter::new(args.rate_limit, args.rate_window())),
        upstream,
        limits,
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Gateway running on http://localhost:{}", args.port);
    info!("Forwarding to {} (model {})", args.upstream_url, crate::upstream::MODEL);
    info!(
        "Rate limit: {} requests per {} seconds",
        args.rate_limit, args.rate_window
    );
    axum::serve(listener, app).await?;

    Ok(())
}
