//! YAML configuration
//!
//! Precedence: CLI args > env vars > config file > built-in defaults. Env vars
//! are bound to CLI args through clap, so only the file and defaults live here.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use skilltokens_core::FatalError;
use skilltokens_counter::gemini::{
    DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
use skilltokens_counter::estimate::DEFAULT_CHARS_PER_TOKEN;
use skilltokens_counter::{EstimateCounter, GeminiConfig, GeminiCounter, TokenCounter, TokenMeter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Default skills directory, relative to the working directory
pub const DEFAULT_TARGET: &str = "../../skills";

/// Ref compared against when `--compare` has no value
pub const DEFAULT_COMPARE_REF: &str = "main";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Skill or skills directory to analyze
    pub target: PathBuf,

    /// Ref used by a bare `--compare`
    pub compare_ref: String,

    pub counter: CounterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target: PathBuf::from(DEFAULT_TARGET),
            compare_ref: DEFAULT_COMPARE_REF.to_string(),
            counter: CounterConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CounterBackend {
    /// Gemini countTokens API (needs an API key)
    Gemini,
    /// Offline characters-per-token estimate
    Estimate,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CounterConfig {
    pub backend: CounterBackend,
    pub model: String,
    pub base_url: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    pub timeout_secs: u64,

    /// Ratio used by the estimate backend
    pub chars_per_token: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        CounterConfig {
            backend: CounterBackend::Gemini,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}

impl CounterConfig {
    /// Build the measurement client once for the whole run.
    ///
    /// The Gemini backend fails with [`FatalError::MissingCredential`] when its
    /// key variable is unset or blank.
    pub fn build_meter(&self) -> Result<TokenMeter> {
        let counter: Arc<dyn TokenCounter> = match self.backend {
            CounterBackend::Estimate => {
                Arc::new(EstimateCounter::with_ratio(self.chars_per_token))
            }
            CounterBackend::Gemini => {
                let api_key = std::env::var(&self.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| FatalError::MissingCredential {
                        env_var: self.api_key_env.clone(),
                    })?;
                let config = GeminiConfig::new(api_key)
                    .with_model(&self.model)
                    .with_base_url(&self.base_url)
                    .with_timeout(Duration::from_secs(self.timeout_secs));
                Arc::new(GeminiCounter::new(config).context("Failed to build Gemini client")?)
            }
        };
        Ok(TokenMeter::new(counter))
    }
}

/// Load configuration from file; a missing file means defaults
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        info!("Config file not found: {}, using defaults", path.display());
        return Ok(Config::default());
    }

    info!("Loading config from: {}", path.display());
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(config)
}
