pub mod handlers;

pub use handlers::{CheckResponse, ErrorResponse, OpportunityView};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::{arbitrage::BatchEvaluator, metrics::ServiceMetrics, sheets::RowSource};

/// Dependencies built once at startup and shared by every request.
pub struct AppState {
    pub source: Arc<dyn RowSource>,
    pub evaluator: BatchEvaluator,
    pub metrics: RwLock<ServiceMetrics>,
}

impl AppState {
    pub fn new(source: Arc<dyn RowSource>, evaluator: BatchEvaluator) -> Self {
        Self {
            source,
            evaluator,
            metrics: RwLock::new(ServiceMetrics::new()),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/check-arbitrage", post(handlers::check_arbitrage))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
