use crate::config::Config;
use crate::error::{AskError, UNKNOWN_ERROR_MESSAGE};
use crate::events::Source;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Duration;
use tracing::debug;

/// Body posted to the ask endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskRequest {
    pub query: String,
}

/// Success body returned by the ask endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
}

impl AskResponse {
    pub fn answer(&self) -> &str {
        self.answer.as_deref().unwrap_or_default()
    }

    pub fn into_sources(self) -> Vec<Source> {
        self.sources.unwrap_or_default()
    }
}

/// Something that can answer a documentation question
#[async_trait]
pub trait AskBackend: Send + Sync {
    async fn ask(&self, query: &str) -> Result<AskResponse, AskError>;
}

/// HTTP client for the documentation assistant endpoint
#[derive(Clone)]
pub struct AskClient {
    url: String,
    client: reqwest::Client,
}

impl AskClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            url: config.ask_url(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Message for a failed exchange: the server's `message` if it sent a
    /// usable one, the status code for any other JSON body, a generic
    /// message if the body was not JSON at all.
    fn failure_message(status: reqwest::StatusCode, body: &[u8]) -> String {
        let Ok(body) = serde_json::from_slice::<Value>(body) else {
            return UNKNOWN_ERROR_MESSAGE.to_string();
        };

        match body.get("message") {
            Some(Value::String(message)) if !message.is_empty() => message.clone(),
            Some(Value::Number(number)) if number.as_f64() != Some(0.0) => number.to_string(),
            Some(Value::Bool(true)) => "true".to_string(),
            _ => format!("Server responded with status: {}", status.as_u16()),
        }
    }
}

#[async_trait]
impl AskBackend for AskClient {
    async fn ask(&self, query: &str) -> Result<AskResponse, AskError> {
        debug!(url = %self.url, "sending ask request");

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&AskRequest {
                query: query.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(AskError::Status {
                status: status.as_u16(),
                message: Self::failure_message(status, &body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| AskError::Decode(e.to_string()))
    }
}
