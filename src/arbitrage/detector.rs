use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::{
    config::ArbitrageConfig,
    types::{ArbitrageOpportunity, PriceQuote, Venue},
};

/// Compares the two venue prices of each quote and reports the spreads.
///
/// Holds only immutable settings, so one instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct OpportunityDetector {
    venue_a_name: String,
    venue_b_name: String,
    min_price_difference: f64,
}

impl OpportunityDetector {
    pub fn new(config: &ArbitrageConfig) -> Result<Self> {
        if !config.min_price_difference.is_finite() || config.min_price_difference < 0.0 {
            return Err(anyhow!(
                "Invalid min_price_difference: {}",
                config.min_price_difference
            ));
        }

        Ok(Self {
            venue_a_name: config.venue_a_name.clone(),
            venue_b_name: config.venue_b_name.clone(),
            min_price_difference: config.min_price_difference,
        })
    }

    /// Emits at most one opportunity per quote, in input order.
    ///
    /// Equal prices never produce an opportunity. A difference must also be
    /// strictly greater than the configured minimum.
    pub fn detect(&self, quotes: &[PriceQuote]) -> Vec<ArbitrageOpportunity> {
        let opportunities: Vec<ArbitrageOpportunity> = quotes
            .iter()
            .filter_map(|quote| self.analyze_quote(quote))
            .collect();

        if !opportunities.is_empty() {
            info!(
                "Found {} arbitrage opportunities across {} quotes",
                opportunities.len(),
                quotes.len()
            );
        }

        opportunities
    }

    fn analyze_quote(&self, quote: &PriceQuote) -> Option<ArbitrageOpportunity> {
        let opportunity = ArbitrageOpportunity::from_quote(quote)?;

        if opportunity.potential_profit <= self.min_price_difference {
            debug!(
                "Spread of {} on {} is within the {} threshold",
                opportunity.potential_profit,
                quote.pair_label(),
                self.min_price_difference
            );
            return None;
        }

        debug!(
            "Potential arbitrage on {}: {} at {} > {} at {}, profit: {}",
            quote.pair_label(),
            self.venue_name(opportunity.higher_venue),
            opportunity.higher_price,
            self.venue_name(opportunity.lower_venue),
            opportunity.lower_price,
            opportunity.potential_profit
        );

        Some(opportunity)
    }

    pub fn venue_name(&self, venue: Venue) -> &str {
        match venue {
            Venue::A => &self.venue_a_name,
            Venue::B => &self.venue_b_name,
        }
    }

    /// Display label such as `"PancakeSwap > BakerySwap"`.
    pub fn route_label(&self, opportunity: &ArbitrageOpportunity) -> String {
        format!(
            "{} > {}",
            self.venue_name(opportunity.higher_venue),
            self.venue_name(opportunity.lower_venue)
        )
    }

    pub fn min_price_difference(&self) -> f64 {
        self.min_price_difference
    }
}

impl Default for OpportunityDetector {
    fn default() -> Self {
        let config = ArbitrageConfig::default();
        Self {
            venue_a_name: config.venue_a_name,
            venue_b_name: config.venue_b_name,
            min_price_difference: config.min_price_difference,
        }
    }
}
