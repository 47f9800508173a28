use anyhow::{Context, Result};
use bsc_arbitrage_checker::{
    api::{self, AppState},
    arbitrage::{BatchEvaluator, OpportunityDetector},
    config::Config,
    sheets::SheetsClient,
    types::Venue,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bsc_arbitrage_checker=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    info!("Starting BSC Arbitrage Checker");

    // Load configuration
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Configuration loaded successfully");

    let detector = OpportunityDetector::new(&config.arbitrage)?;
    info!(
        "Comparing {} (A) against {} (B), reporting spreads above {}",
        detector.venue_name(Venue::A),
        detector.venue_name(Venue::B),
        detector.min_price_difference()
    );

    let source = SheetsClient::new(&config.sheets).map_err(|e| {
        error!("Failed to initialize Sheets client: {}", e);
        e
    })?;

    let state = Arc::new(AppState::new(
        Arc::new(source),
        BatchEvaluator::new(detector),
    ));
    let app = api::router(state.clone());

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("Server running on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("{}", state.metrics.read().await.generate_report());
    info!("BSC Arbitrage Checker shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
