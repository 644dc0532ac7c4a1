//! Token Measurement
//!
//! Turns text into a token count through a pluggable [`TokenCounter`]:
//! - `GeminiCounter`: the Gemini `countTokens` endpoint
//! - `EstimateCounter`: offline characters-per-token heuristic
//!
//! [`TokenMeter`] wraps a counter with the per-unit failure policy: blank text
//! is never sent, and a failed count is logged and becomes zero.

pub mod estimate;
pub mod gemini;

pub use estimate::EstimateCounter;
pub use gemini::{GeminiConfig, GeminiCounter};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum CounterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("Counter error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CounterError>;

/// Measurement service contract
#[async_trait]
pub trait TokenCounter: Send + Sync {
    /// Short backend label used in logs
    fn name(&self) -> &str;

    async fn count(&self, text: &str) -> Result<u64>;
}

/// Fault-isolating front end to a [`TokenCounter`].
///
/// Built once at startup and shared by every analysis pass.
#[derive(Clone)]
pub struct TokenMeter {
    counter: Arc<dyn TokenCounter>,
}

impl TokenMeter {
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        TokenMeter { counter }
    }

    pub fn counter_name(&self) -> &str {
        self.counter.name()
    }

    /// Count tokens in `text`; `label` identifies the unit in warnings.
    ///
    /// Never fails: whitespace-only text is 0 without a call, errors are 0.
    pub async fn measure(&self, text: &str, label: &str) -> u64 {
        if text.trim().is_empty() {
            return 0;
        }
        match self.counter.count(text).await {
            Ok(tokens) => {
                debug!("{} tokens in {} ({})", tokens, label, self.counter.name());
                tokens
            }
            Err(e) => {
                warn!("Error counting tokens for {}: {}", label, e);
                0
            }
        }
    }
}

impl std::fmt::Debug for TokenMeter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenMeter")
            .field("counter", &self.counter.name())
            .finish()
    }
}
