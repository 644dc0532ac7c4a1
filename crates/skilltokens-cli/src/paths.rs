//! Configuration file location for skill-tokens
//!
//! Follows the XDG Base Directory specification on Linux and platform
//! conventions on macOS and Windows.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Application identifier for directory structures
const APP_QUALIFIER: &str = "dev";
const APP_ORGANIZATION: &str = "skill-tokens";
const APP_NAME: &str = "skill-tokens";

/// File name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Fallback configuration file in the current directory
pub const LOCAL_CONFIG_FILE: &str = "skill-tokens.yaml";

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "SKILL_TOKENS_CONFIG_DIR";

/// System paths for skill-tokens
#[derive(Debug, Clone)]
pub struct ToolPaths {
    /// Configuration directory
    pub config_dir: PathBuf,
}

impl ToolPaths {
    /// Create paths using system defaults
    ///
    /// - Linux: ~/.config/skill-tokens
    /// - macOS: ~/Library/Application Support/dev.skill-tokens.skill-tokens
    /// - Windows: %APPDATA%\skill-tokens\skill-tokens\config
    pub fn new() -> Result<Self> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(Self::with_root(dir));
        }

        let project_dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .context("Failed to determine system directories")?;

        Ok(Self {
            config_dir: project_dirs.config_dir().to_path_buf(),
        })
    }

    /// Place the configuration directory at `root`
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            config_dir: root.as_ref().to_path_buf(),
        }
    }

    /// Get default config file path
    pub fn default_config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

/// Config file to load: explicit path, else system config, else `./skill-tokens.yaml`
pub fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let system = ToolPaths::new()?.default_config_file();
    if system.exists() {
        Ok(system)
    } else {
        Ok(PathBuf::from(LOCAL_CONFIG_FILE))
    }
}
