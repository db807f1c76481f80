//! AgentApiClient - REST implementation of the translate/execute/explain
//! endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use riskviz_core::agent::{AgentBackend, ExecuteOutcome, Explanation};
use riskviz_core::error::Result;

use crate::config::ApiConfig;
use crate::http;

/// HTTP client for the agent inference endpoints.
#[derive(Clone)]
pub struct AgentApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    question: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sheet: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    code: String,
}

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sheet: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    question: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ExplainRequest<'a> {
    question: &'a str,
    data: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<&'a Value>,
}

impl AgentApiClient {
    /// Creates a new client from the given configuration.
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        }
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
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

        response
            .json::<Resp>()
            .await
            .map_err(|e| http::decode_error(path, e))
    }
}

#[async_trait]
impl AgentBackend for AgentApiClient {
    async fn translate(&self, question: &str, sheet: Option<&str>) -> Result<String> {
        let response: TranslateResponse = self
            .post_json("/agent/translate", &TranslateRequest { question, sheet })
            .await?;
        Ok(response.code)
    }

    async fn execute(
        &self,
        code: &str,
        sheet: Option<&str>,
        question: Option<&str>,
    ) -> Result<ExecuteOutcome> {
        self.post_json(
            "/agent/execute",
            &ExecuteRequest {
                code,
                sheet,
                question,
            },
        )
        .await
    }

    async fn explain(
        &self,
        question: &str,
        data: &Value,
        meta: Option<&Value>,
    ) -> Result<Explanation> {
        self.post_json(
            "/agent/explain",
            &ExplainRequest {
                question,
                data,
                meta,
            },
        )
        .await
    }
}
