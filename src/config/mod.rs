use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Base URL of the remote content store; sample content is used when unset
    pub store_url: Option<String>,
    /// Bearer key for store write operations
    pub store_api_key: Option<String>,
    /// Base URL of the video metadata API; the mock list is used when unset
    pub video_api_url: Option<String>,
    /// Channel whose videos are listed
    pub video_channel_id: Option<String>,
    /// Transport skip step in seconds
    pub skip_step_secs: u64,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// Category filter applied at startup
    pub default_category: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            store_api_key: None,
            video_api_url: None,
            video_channel_id: None,
            skip_step_secs: 15,
            request_timeout_secs: 30,
            default_category: "All".to_string(),
        }
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    config: AppConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path()?;
        let config = Self::load_config(&config_path).unwrap_or_default();

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Manager rooted at an explicit path (used by tests)
    pub fn with_path(config_path: PathBuf) -> Self {
        let config = Self::load_config(&config_path).unwrap_or_default();
        Self {
            config,
            config_path,
        }
    }

    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    pub fn update_config<F>(&mut self, updater: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut AppConfig),
    {
        updater(&mut self.config);
        self.save_config()
    }

    pub fn set_store_url(&mut self, url: Option<String>) -> Result<(), ConfigError> {
        self.config.store_url = url;
        self.save_config()
    }

    pub fn set_video_channel(&mut self, channel_id: Option<String>) -> Result<(), ConfigError> {
        self.config.video_channel_id = channel_id;
        self.save_config()
    }

    pub fn set_skip_step(&mut self, seconds: u64) -> Result<(), ConfigError> {
        self.config.skip_step_secs = seconds.max(1);
        self.save_config()
    }

    pub fn set_default_category(&mut self, category: String) -> Result<(), ConfigError> {
        self.config.default_category = category;
        self.save_config()
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.config = AppConfig::default();
        self.save_config()
    }

    fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::home_dir()
            .ok_or(ConfigError::ConfigDirNotFound)?
            .join(".config")
            .join("church-player");

        std::fs::create_dir_all(&config_dir).map_err(ConfigError::Io)?;

        Ok(config_dir.join("config.toml"))
    }

    fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }

        let config_content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: AppConfig = toml::from_str(&config_content)?;

        Ok(config)
    }

    fn save_config(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }

        let config_content = toml::to_string_pretty(&self.config)?;
        std::fs::write(&self.config_path, config_content).map_err(ConfigError::Io)?;

        Ok(())
    }
}
