use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use super::AppState;
use crate::{
    arbitrage::OpportunityDetector,
    metrics::ServiceMetrics,
    types::{ArbitrageOpportunity, RowRejection},
};

pub const OPPORTUNITIES_FOUND: &str = "Arbitrage opportunities found.";
pub const NO_OPPORTUNITIES: &str = "No arbitrage opportunities found.";
pub const NO_PRICE_DATA: &str = "No price data available.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityView {
    #[serde(flatten)]
    pub opportunity: ArbitrageOpportunity,
    pub higher_venue_name: String,
    pub lower_venue_name: String,
    pub arbitrage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread_percentage: Option<f64>,
}

impl OpportunityView {
    pub fn new(opportunity: ArbitrageOpportunity, detector: &OpportunityDetector) -> Self {
        Self {
            higher_venue_name: detector.venue_name(opportunity.higher_venue).to_string(),
            lower_venue_name: detector.venue_name(opportunity.lower_venue).to_string(),
            arbitrage: detector.route_label(&opportunity),
            spread_percentage: opportunity.spread_percentage(),
            opportunity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunities: Option<Vec<OpportunityView>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejections: Vec<RowRejection>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn check_arbitrage(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CheckResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!("Received request to check arbitrage");

    let rows = match state.source.fetch_rows().await {
        Ok(rows) if !rows.is_empty() => rows,
        Ok(_) => return Err(fetch_failure(&state, "source returned no rows").await),
        Err(e) => {
            let message = e.to_string();
            return Err(fetch_failure(&state, &message).await);
        }
    };

    let evaluation = state.evaluator.evaluate(&rows);
    state.metrics.write().await.record_evaluation(&evaluation);

    let detector = state.evaluator.detector();
    let response = if evaluation.has_opportunities {
        for opportunity in &evaluation.opportunities {
            info!(
                "Arbitrage opportunity: {}/{} {}, potential profit: {}",
                opportunity.token_in,
                opportunity.token_out,
                detector.route_label(opportunity),
                opportunity.potential_profit
            );
        }

        CheckResponse {
            message: OPPORTUNITIES_FOUND.to_string(),
            opportunities: Some(
                evaluation
                    .opportunities
                    .into_iter()
                    .map(|opp| OpportunityView::new(opp, detector))
                    .collect(),
            ),
            rejections: evaluation.rejections,
        }
    } else {
        CheckResponse {
            message: NO_OPPORTUNITIES.to_string(),
            opportunities: None,
            rejections: evaluation.rejections,
        }
    };

    Ok(Json(response))
}

async fn fetch_failure(state: &AppState, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    error!("Error fetching prices from {}: {}", state.source.name(), message);
    state.metrics.write().await.record_fetch_failure(message);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: NO_PRICE_DATA.to_string(),
        }),
    )
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<ServiceMetrics> {
    Json(state.metrics.read().await.snapshot())
}
