//! Gemini `countTokens` client

use crate::{CounterError, Result, TokenCounter};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        GeminiConfig {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{base_url}/models/{model}:countTokens`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:countTokens",
            self.base_url.trim_end_matches('/'),
            self.model.trim_start_matches("models/")
        )
    }
}

#[derive(Debug, Serialize)]
struct CountTokensRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CountTokensResponse {
    #[serde(rename = "totalTokens", default)]
    total_tokens: u64,
}

/// Counts tokens with the model's own tokenizer
pub struct GeminiCounter {
    http: Client,
    endpoint: String,
    model: String,
}

impl GeminiCounter {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| CounterError::InvalidApiKey(e.to_string()))?;
        let headers = HeaderMap::from_iter([(HeaderName::from_static("x-goog-api-key"), key)]);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(GeminiCounter {
            http,
            endpoint: config.endpoint(),
            model: config.model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TokenCounter for GeminiCounter {
    fn name(&self) -> &str {
        &self.model
    }

    async fn count(&self, text: &str) -> Result<u64> {
        let request = CountTokensRequest {
            contents: vec![Content {
                parts: vec![Part { text }],
            }],
        };

        debug!("POST {} ({} chars)", self.endpoint, text.len());
        let response = self.http.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CounterError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CountTokensResponse = response.json().await?;
        Ok(parsed.total_tokens)
    }
}
