//! Offline token estimate.
//!
//! English prose averages about four characters per token, which is close
//! enough for dry runs and for comparing two snapshots with the same ruler.

use crate::{Result, TokenCounter};
use async_trait::async_trait;

/// Default characters per token for prose and markdown
pub const DEFAULT_CHARS_PER_TOKEN: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct EstimateCounter {
    chars_per_token: f64,
}

impl EstimateCounter {
    pub fn new() -> Self {
        Self::with_ratio(DEFAULT_CHARS_PER_TOKEN)
    }

    /// Non-positive ratios fall back to the default
    pub fn with_ratio(chars_per_token: f64) -> Self {
        let chars_per_token = if chars_per_token > 0.0 {
            chars_per_token
        } else {
            DEFAULT_CHARS_PER_TOKEN
        };
        EstimateCounter { chars_per_token }
    }

    pub fn estimate(&self, text: &str) -> u64 {
        (text.chars().count() as f64 / self.chars_per_token).ceil() as u64
    }
}

impl Default for EstimateCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenCounter for EstimateCounter {
    fn name(&self) -> &str {
        "estimate"
    }

    async fn count(&self, text: &str) -> Result<u64> {
        Ok(self.estimate(text))
    }
}
