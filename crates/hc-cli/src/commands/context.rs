//! Shared command context
//!
//! Loads the configuration and wires the store, spam checker and manager
//! the way every comment command needs them.

use anyhow::{Context, Result};
use clap::Args;
use hc_akismet::AkismetClient;
use hc_core::comment::ManagerSettings;
use hc_core::{
    CommentManager, CommentStore, CommentableRecord, Config, CounterCache, NullSpamChecker,
    OwnerRef, PolicyValue, RequestContext, SpamChecker,
};
use hc_storage::FileSystemStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Config location used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = ".has-comments/config.toml";

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_PATH)
}

/// Owner selection shared by several commands
#[derive(Debug, Clone, Args)]
pub struct OwnerArgs {
    /// Owner type, e.g. Post
    #[arg(long = "owner-type", short = 't')]
    pub owner_type: String,

    /// Owner identifier
    #[arg(long = "owner-id", short = 'o')]
    pub owner_id: String,
}

impl OwnerArgs {
    pub fn owner_ref(&self) -> OwnerRef {
        OwnerRef::new(self.owner_type.clone(), &self.owner_id)
    }
}

/// Details of the submitting request, forwarded to the spam service
#[derive(Debug, Clone, Default, Args)]
pub struct RequestArgs {
    /// Client IP address
    #[arg(long)]
    pub ip: Option<String>,

    /// Client user agent
    #[arg(long)]
    pub user_agent: Option<String>,

    /// HTTP referrer
    #[arg(long)]
    pub referrer: Option<String>,
}

impl RequestArgs {
    pub fn to_context(&self) -> RequestContext {
        RequestContext {
            user_ip: self.ip.clone(),
            user_agent: self.user_agent.clone(),
            referrer: self.referrer.clone(),
        }
    }
}

/// Parse `NAME=VALUE`; VALUE is read as JSON, falling back to a plain string
pub fn parse_predicate(s: &str) -> std::result::Result<(String, PolicyValue), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err("predicate name cannot be empty".to_string());
    }
    let value = serde_json::from_str::<serde_json::Value>(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((name.to_string(), PolicyValue(value)))
}

/// Loaded configuration plus helpers to build the moderation stack
pub struct AppContext {
    pub config_path: PathBuf,
    pub config: Config,
}

impl AppContext {
    /// Load configuration from `path` or the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        let config = Config::load_or_default(&config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?;
        debug!("Loaded config from {}", config_path.display());
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Open the comment store under the configured data directory
    pub fn store(&self) -> Result<Arc<FileSystemStore>> {
        let data_dir = &self.config.storage.data_dir;
        let store = FileSystemStore::new(data_dir)
            .with_context(|| format!("Failed to open storage at {}", data_dir.display()))?;
        Ok(Arc::new(store))
    }

    /// The configured spam service, or one that never flags anything
    pub fn spam_checker(&self) -> Result<Arc<dyn SpamChecker>> {
        if !self.config.akismet.is_enabled() {
            return Ok(Arc::new(NullSpamChecker));
        }
        let client = AkismetClient::from_config(&self.config.akismet)
            .context("Failed to set up spam service client")?;
        Ok(Arc::new(client))
    }

    pub fn manager(&self) -> Result<CommentManager> {
        let store: Arc<dyn CommentStore> = self.store()?;
        let settings = ManagerSettings {
            inconclusive_as_spam: self.config.moderation.inconclusive_as_spam,
        };
        Ok(CommentManager::with_spam_checker(store, self.spam_checker()?).settings(settings))
    }

    /// Build the owner record with its type's options and current counts
    pub fn owner(
        &self,
        store: &dyn CommentStore,
        owner: OwnerRef,
        predicates: &[(String, PolicyValue)],
    ) -> Result<CommentableRecord> {
        let counts = CounterCache {
            comments_count: store.count_for_owner(&owner)?,
            approved_comments_count: store.count_approved_for_owner(&owner)?,
        };
        let options = Arc::new(self.config.options_for(&owner.owner_type));

        let mut record = CommentableRecord::new(owner, options).with_counts(counts);
        for (name, value) in predicates {
            let value = value.clone();
            record = record.with_predicate(name.clone(), move |_| value.clone());
        }
        Ok(record)
    }
}
