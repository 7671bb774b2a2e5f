//! Config store port

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Persistent user configuration
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Stored config; an empty config when nothing has been saved yet
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Replace the stored config, creating parent directories as needed
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Write `AppConfig::defaults()`; `AlreadyExists` if a file is present
    async fn init(&self) -> Result<(), ConfigError>;

    fn path(&self) -> PathBuf;

    fn exists(&self) -> bool {
        self.path().is_file()
    }

    /// Like `load`, but an unreadable file is logged and treated as empty
    async fn load_or_empty(&self) -> AppConfig {
        match self.load().await {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring config file {}: {}", self.path().display(), e);
                AppConfig::empty()
            }
        }
    }
}
