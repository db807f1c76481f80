//! WorkbookApiClient - REST implementation of the workbook service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use riskviz_core::error::Result;
use riskviz_core::workbook::{WorkbookBackend, WorkbookSheet};

use crate::config::ApiConfig;
use crate::http;

/// HTTP client for the workbook endpoints: sheet listing, example-dataset
/// bootstrap, reset, and health.
#[derive(Clone)]
pub struct WorkbookApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct SheetsResponse {
    #[serde(default)]
    sheets: Vec<WorkbookSheet>,
}

#[derive(Debug, Serialize)]
struct LoadExampleRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    example_type: Option<&'a str>,
}

impl WorkbookApiClient {
    /// Creates a new client from the given configuration.
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        }
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| http::transport_error(path, e))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(response).await);
        }
        Ok(response)
    }

    async fn post<Req: Serialize + Sync>(&self, path: &str, body: &Req) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| http::transport_error(path, e))?;

        if !response.status().is_success() {
            return Err(http::error_from_response(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl WorkbookBackend for WorkbookApiClient {
    async fn list_sheets(&self) -> Result<Vec<WorkbookSheet>> {
        let response = self.get("/workbook/sheets").await?;
        let payload: SheetsResponse = response
            .json()
            .await
            .map_err(|e| http::decode_error("/workbook/sheets", e))?;
        Ok(payload.sheets)
    }

    async fn load_example(&self, example_type: Option<&str>) -> Result<()> {
        self.post("/workbook/load-example", &LoadExampleRequest { example_type })
            .await
    }

    async fn reset(&self) -> Result<()> {
        self.post("/workbook/reset", &serde_json::json!({})).await
    }

    async fn health_check(&self) -> Result<()> {
        self.get("/health").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheets_response_parses_backend_shape() {
        let payload: SheetsResponse = serde_json::from_str(
            r#"{"sheets":[{"id":"s1","name":"Incidents 2024","row_count":120,"column_count":8,"last_modified":"2026-08-01T00:00:00Z"}]}"#,
        )
        .unwrap();
        assert_eq!(payload.sheets.len(), 1);
        assert_eq!(payload.sheets[0].name, "Incidents 2024");
    }

    #[test]
    fn test_load_example_request_omits_absent_type() {
        let body = serde_json::to_string(&LoadExampleRequest { example_type: None }).unwrap();
        assert_eq!(body, "{}");
    }
}
