use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of untyped cells as fetched from the tabular source.
pub type RawRow = Vec<String>;

/// Column layout of a price row: `[timestamp, tokenIn, tokenOut, priceVenueA, priceVenueB, ...]`.
pub const TIMESTAMP_COLUMN: usize = 0;
pub const TOKEN_IN_COLUMN: usize = 1;
pub const TOKEN_OUT_COLUMN: usize = 2;
pub const PRICE_VENUE_A_COLUMN: usize = 3;
pub const PRICE_VENUE_B_COLUMN: usize = 4;
pub const REQUIRED_COLUMNS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    A,
    B,
}

impl Venue {
    pub fn other(self) -> Self {
        match self {
            Venue::A => Venue::B,
            Venue::B => Venue::A,
        }
    }
}

/// A validated price row. Both prices are finite and non-negative.
///
/// Fields are public for reading and test fixtures; [`parse_row`](crate::arbitrage::parse_row)
/// is the only constructor that enforces the price invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub timestamp: String,
    pub token_in: String,
    pub token_out: String,
    pub price_venue_a: f64,
    pub price_venue_b: f64,
}

impl PriceQuote {
    pub fn price(&self, venue: Venue) -> f64 {
        match venue {
            Venue::A => self.price_venue_a,
            Venue::B => self.price_venue_b,
        }
    }

    pub fn pair_label(&self) -> String {
        format!("{}/{}", self.token_in, self.token_out)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrageOpportunity {
    pub token_in: String,
    pub token_out: String,
    pub higher_venue: Venue,
    pub lower_venue: Venue,
    pub higher_price: f64,
    pub lower_price: f64,
    /// `higher_price - lower_price`, always strictly positive.
    pub potential_profit: f64,
}

impl ArbitrageOpportunity {
    /// Builds an opportunity from a quote, or `None` when both venues quote the same price.
    pub fn from_quote(quote: &PriceQuote) -> Option<Self> {
        let higher_venue = if quote.price_venue_a > quote.price_venue_b {
            Venue::A
        } else if quote.price_venue_b > quote.price_venue_a {
            Venue::B
        } else {
            return None;
        };
        let lower_venue = higher_venue.other();
        let higher_price = quote.price(higher_venue);
        let lower_price = quote.price(lower_venue);

        Some(Self {
            token_in: quote.token_in.clone(),
            token_out: quote.token_out.clone(),
            higher_venue,
            lower_venue,
            higher_price,
            lower_price,
            potential_profit: higher_price - lower_price,
        })
    }

    /// Spread relative to the cheaper venue, in percent. Undefined when the lower price is zero.
    pub fn spread_percentage(&self) -> Option<f64> {
        if self.lower_price > 0.0 {
            Some(self.potential_profit / self.lower_price * 100.0)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum RejectionReason {
    #[error("row is missing one or more required fields")]
    MissingFields,
    #[error("token identifier is empty")]
    MissingToken,
    #[error("price is not a number")]
    NonNumericPrice,
    #[error("price is negative")]
    NegativePrice,
    #[error("price is NaN or infinite")]
    NonFiniteValue,
}

/// Diagnostic for a row that could not be promoted to a [`PriceQuote`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRejection {
    /// Zero-based position of the row in the input batch.
    pub row_index: usize,
    pub reason: RejectionReason,
    pub row: RawRow,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRows {
    pub quotes: Vec<PriceQuote>,
    pub rejections: Vec<RowRejection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEvaluation {
    pub opportunities: Vec<ArbitrageOpportunity>,
    pub rejections: Vec<RowRejection>,
    pub has_opportunities: bool,
}
