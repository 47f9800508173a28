pub mod auth;
pub mod client;

pub use auth::{ServiceAccountAuth, ServiceAccountKey};
pub use client::SheetsClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::RawRow;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No data found in the spreadsheet")]
    NoData,
}

/// Supplier of raw price rows, consulted once per check.
#[async_trait]
pub trait RowSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_rows(&self) -> Result<Vec<RawRow>, SheetsError>;
}
