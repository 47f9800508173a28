pub mod config;
pub mod types;
pub mod arbitrage;
pub mod sheets;
pub mod metrics;
pub mod api;

pub use config::Config;
pub use types::*;
