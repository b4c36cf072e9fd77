//! Crowd Sentiment Service: binary entrypoint.
//! Boots the Axum HTTP server: engine config, supplier chain, metrics and routes.

use std::sync::Arc;

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crowd_sentiment::api::{self, AppState};
use crowd_sentiment::clock::{Clock, SystemClock};
use crowd_sentiment::config::EngineConfig;
use crowd_sentiment::ingest::providers;
use crowd_sentiment::SentimentEngine;

/// Compact logs by default; `SENTIMENT_LOG_JSON=1` switches to JSON lines.
/// `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crowd_sentiment=info,warn"));

    let json = std::env::var("SENTIMENT_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    // The runtime may already have installed a subscriber; keep it in that case.
    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already set");
    }
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = EngineConfig::load()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let supplier = Arc::new(providers::from_config(&cfg, clock.clone()));

    tracing::info!(
        recent_ttl_secs = cfg.cache.recent_ttl_secs,
        historical_ttl_secs = cfg.cache.historical_ttl_secs,
        suppliers = supplier.len(),
        "engine configured"
    );

    let state = AppState::new(SentimentEngine::new(supplier, clock, cfg));
    let router = api::router(state);

    Ok(router.into())
}
