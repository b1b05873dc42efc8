//! Configuration management for has-comments

use crate::error::{HasCommentsError, Result};
use crate::options::CommentableOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Akismet REST endpoint
pub const DEFAULT_AKISMET_ENDPOINT: &str = "https://rest.akismet.com/1.1";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings
    pub storage: StorageConfig,
    /// Spam service settings
    pub akismet: AkismetConfig,
    /// Moderation behaviour shared by all owner types
    pub moderation: ModerationConfig,
    /// Options per owner type, keyed by type tag
    pub owners: BTreeMap<String, CommentableOptions>,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            HasCommentsError::Io(e)
                .with_context(format!("Failed to read config {}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load configuration, falling back to defaults if the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| HasCommentsError::Toml(e.to_string()))
    }

    /// Options for an owner type; unknown types get the defaults
    pub fn options_for(&self, owner_type: &str) -> CommentableOptions {
        self.owners.get(owner_type).cloned().unwrap_or_default()
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> Result<()> {
        if self.akismet.is_enabled() && self.akismet.blog.trim().is_empty() {
            return Err(HasCommentsError::Config(
                "akismet.blog is required when akismet.key is set".to_string(),
            ));
        }
        if self.akismet.timeout_secs == 0 {
            return Err(HasCommentsError::Config(
                "akismet.timeout_secs must be greater than zero".to_string(),
            ));
        }
        for owner_type in self.owners.keys() {
            if owner_type.trim().is_empty() {
                return Err(HasCommentsError::Config(
                    "owner type names cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Storage-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding comment files
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".has-comments/data"),
        }
    }
}

/// Akismet-compatible spam service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AkismetConfig {
    /// API key; empty disables spam checking
    pub key: String,
    /// Front page of the site comments are posted on
    pub blog: String,
    /// REST endpoint root
    pub endpoint: String,
    /// Upper bound for one service call
    pub timeout_secs: u64,
}

impl Default for AkismetConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            blog: String::new(),
            endpoint: DEFAULT_AKISMET_ENDPOINT.to_string(),
            timeout_secs: 5,
        }
    }
}

impl AkismetConfig {
    pub fn is_enabled(&self) -> bool {
        !self.key.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Moderation settings shared by all owner types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Treat an unreachable or failing spam service as a spam verdict
    pub inconclusive_as_spam: bool,
}
