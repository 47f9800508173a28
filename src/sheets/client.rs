use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::{RowSource, ServiceAccountAuth, ServiceAccountKey, SheetsError};
use crate::{config::SheetsConfig, types::RawRow};

/// Reads a fixed range of a spreadsheet through the Sheets v4 values API.
pub struct SheetsClient {
    http: reqwest::Client,
    auth: ServiceAccountAuth,
    values_url: Url,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsClient {
    pub fn new(config: &SheetsConfig) -> Result<Self> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(anyhow!("sheets.spreadsheet_id is not configured"));
        }

        let credentials = config
            .credentials_json
            .as_deref()
            .ok_or_else(|| anyhow!("sheets.credentials_json is not configured"))?;
        let key = ServiceAccountKey::from_json(credentials)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        let auth = ServiceAccountAuth::new(key, http.clone())?;
        let values_url = values_url(&config.api_base_url, &config.spreadsheet_id, &config.range)?;

        info!(
            "Sheets client ready for {} as {}",
            values_url,
            auth.client_email()
        );

        Ok(Self {
            http,
            auth,
            values_url,
        })
    }
}

#[async_trait]
impl RowSource for SheetsClient {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>, SheetsError> {
        let token = self.auth.access_token().await?;

        let response = self
            .http
            .get(self.values_url.clone())
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let range: ValueRange = response.json().await?;
        let rows = rows_from_values(range.values);

        if rows.is_empty() {
            return Err(SheetsError::NoData);
        }

        debug!("Fetched {} rows from spreadsheet", rows.len());
        Ok(rows)
    }
}

/// `{base}/v4/spreadsheets/{id}/values/{range}`, with each segment percent-encoded.
pub fn values_url(api_base: &str, spreadsheet_id: &str, range: &str) -> Result<Url, SheetsError> {
    let mut url = Url::parse(api_base)
        .map_err(|e| SheetsError::InvalidUrl(format!("{}: {}", api_base, e)))?;

    url.path_segments_mut()
        .map_err(|_| SheetsError::InvalidUrl(api_base.to_string()))?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);

    Ok(url)
}

/// Cells arrive as formatted strings; anything else is stringified and nulls become empty cells.
pub fn rows_from_values(values: Vec<Vec<Value>>) -> Vec<RawRow> {
    values
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect()
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, State},
        http::{header::AUTHORIZATION, HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tokio::net::TcpListener;

    const TEST_PRIVATE_KEY: &str = include_str!("testdata/rsa_key.pem");
    const TEST_ACCESS_TOKEN: &str = "test-access-token";

    #[derive(Clone)]
    struct MockGoogle {
        token_calls: Arc<AtomicUsize>,
        expires_in: u64,
    }

    async fn token_endpoint(State(mock): State<MockGoogle>) -> Json<Value> {
        mock.token_calls.fetch_add(1, Ordering::SeqCst);
        Json(json!({
            "access_token": TEST_ACCESS_TOKEN,
            "expires_in": mock.expires_in,
            "token_type": "Bearer"
        }))
    }

    async fn values_endpoint(
        Path((spreadsheet_id, range)): Path<(String, String)>,
        headers: HeaderMap,
    ) -> Response {
        let expected = format!("Bearer {}", TEST_ACCESS_TOKEN);
        if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
            return StatusCode::UNAUTHORIZED.into_response();
        }

        match spreadsheet_id.as_str() {
            "full" => Json(json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [
                    ["t1", "BNB", "USDT", "310.5", "309.8"],
                    ["t2", "CAKE", "BUSD", "2", "2"]
                ]
            }))
            .into_response(),
            "empty" => Json(json!({ "range": range, "majorDimension": "ROWS" })).into_response(),
            _ => (StatusCode::FORBIDDEN, "The caller does not have permission").into_response(),
        }
    }

    /// Serves the token and values endpoints on an ephemeral local port.
    async fn spawn_mock_google(expires_in: u64) -> (String, Arc<AtomicUsize>) {
        let mock = MockGoogle {
            token_calls: Arc::new(AtomicUsize::new(0)),
            expires_in,
        };
        let token_calls = mock.token_calls.clone();

        let app = Router::new()
            .route("/token", post(token_endpoint))
            .route("/v4/spreadsheets/:id/values/:range", get(values_endpoint))
            .with_state(mock);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", address), token_calls)
    }

    fn create_test_config(base_url: &str, spreadsheet_id: &str) -> SheetsConfig {
        let credentials = json!({
            "type": "service_account",
            "client_email": "checker@test-project.iam.gserviceaccount.com",
            "private_key": TEST_PRIVATE_KEY,
            "token_uri": format!("{}/token", base_url)
        });

        SheetsConfig {
            spreadsheet_id: spreadsheet_id.to_string(),
            credentials_json: Some(credentials.to_string()),
            api_base_url: base_url.to_string(),
            ..SheetsConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_rows_reuses_cached_token() {
        let (base_url, token_calls) = spawn_mock_google(3600).await;
        let client = SheetsClient::new(&create_test_config(&base_url, "full")).unwrap();

        let first = client.fetch_rows().await.unwrap();
        let second = client.fetch_rows().await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first[0], vec!["t1", "BNB", "USDT", "310.5", "309.8"]);
        assert_eq!(first, second);
        assert_eq!(token_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_rows_refreshes_token_near_expiry() {
        // Tokens inside the expiry margin are never reused
        let (base_url, token_calls) = spawn_mock_google(30).await;
        let client = SheetsClient::new(&create_test_config(&base_url, "full")).unwrap();

        client.fetch_rows().await.unwrap();
        client.fetch_rows().await.unwrap();

        assert_eq!(token_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_rows_huge_expires_in() {
        let (base_url, token_calls) = spawn_mock_google(u64::MAX).await;
        let client = SheetsClient::new(&create_test_config(&base_url, "full")).unwrap();

        assert_eq!(client.fetch_rows().await.unwrap().len(), 2);
        assert_eq!(client.fetch_rows().await.unwrap().len(), 2);
        assert_eq!(token_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_rows_empty_sheet() {
        let (base_url, _) = spawn_mock_google(3600).await;
        let client = SheetsClient::new(&create_test_config(&base_url, "empty")).unwrap();

        let err = client.fetch_rows().await.unwrap_err();
        assert!(matches!(err, SheetsError::NoData));
    }

    #[tokio::test]
    async fn test_fetch_rows_error_status() {
        let (base_url, _) = spawn_mock_google(3600).await;
        let client = SheetsClient::new(&create_test_config(&base_url, "forbidden")).unwrap();

        match client.fetch_rows().await.unwrap_err() {
            SheetsError::Status { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("permission"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_values_url() {
        let url = values_url("https://sheets.googleapis.com", "abc123", "Sheet1!A:E").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/Sheet1!A:E"
        );
    }

    #[test]
    fn test_values_url_encodes_segments() {
        let url = values_url("http://localhost:8080/", "id", "Price Feed!A:E").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v4/spreadsheets/id/values/Price%20Feed!A:E"
        );
    }

    #[test]
    fn test_values_url_invalid_base() {
        assert!(matches!(
            values_url("not a url", "id", "A:E"),
            Err(SheetsError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rows_from_values() {
        let range: ValueRange = serde_json::from_value(json!({
            "range": "Sheet1!A1:E3",
            "majorDimension": "ROWS",
            "values": [
                ["t1", "BNB", "USDT", "310.5", "309.8"],
                ["t2", "BNB", "USDT", 300, 300.25, true],
                ["t3", null, "USDT"]
            ]
        }))
        .unwrap();

        let rows = rows_from_values(range.values);

        assert_eq!(rows[0], vec!["t1", "BNB", "USDT", "310.5", "309.8"]);
        assert_eq!(rows[1], vec!["t2", "BNB", "USDT", "300", "300.25", "true"]);
        assert_eq!(rows[2], vec!["t3", "", "USDT"]);
    }

    #[test]
    fn test_missing_values_is_empty() {
        let range: ValueRange = serde_json::from_value(json!({"range": "Sheet1!A:E"})).unwrap();
        assert!(rows_from_values(range.values).is_empty());
    }

    #[test]
    fn test_new_requires_credentials() {
        let config = SheetsConfig {
            spreadsheet_id: "abc".to_string(),
            ..SheetsConfig::default()
        };
        assert!(SheetsClient::new(&config).is_err());

        assert!(SheetsClient::new(&SheetsConfig::default()).is_err());
    }
}
