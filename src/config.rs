use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub arbitrage: ArbitrageConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub range: String,
    /// Service-account key JSON, usually supplied through `GOOGLE_CREDENTIALS`.
    pub credentials_json: Option<String>,
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ArbitrageConfig {
    pub venue_a_name: String,
    pub venue_b_name: String,
    /// Price differences at or below this value are not reported.
    pub min_price_difference: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            range: "Sheet1!A:E".to_string(),
            credentials_json: None,
            api_base_url: "https://sheets.googleapis.com".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            venue_a_name: "PancakeSwap".to_string(),
            venue_b_name: "BakerySwap".to_string(),
            min_price_difference: 0.0,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let mut settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(
                config::Environment::with_prefix("ARBITRAGE")
                    .separator("__")
                    .try_parsing(true),
            );

        // Plain deployment variables win over the prefixed ones
        if let Ok(port) = std::env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        if let Ok(spreadsheet_id) = std::env::var("SPREADSHEET_ID") {
            settings = settings.set_override("sheets.spreadsheet_id", spreadsheet_id)?;
        }

        if let Ok(credentials) = std::env::var("GOOGLE_CREDENTIALS") {
            settings = settings.set_override("sheets.credentials_json", credentials)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }
}
