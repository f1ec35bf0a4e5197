use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that takes precedence over `tmdb.api_key`.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

/// Suggestion dropdowns never show more than this many entries.
pub const MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TmdbConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
    /// Distance (in rows or pixels, whatever the front end measures) at which
    /// the scroll sentinel counts as visible.
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold_px: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Unset means JSON only when stdout is not a terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_suggestion_limit() -> usize {
    MAX_SUGGESTIONS
}

fn default_scroll_threshold() -> u32 {
    200
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            language: default_language(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            suggestion_limit: default_suggestion_limit(),
            scroll_threshold_px: default_scroll_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: None,
            file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.suggestion_limit == 0 || self.feed.suggestion_limit > MAX_SUGGESTIONS {
            return Err(ConfigError::InvalidSetting {
                field: "feed.suggestion_limit",
                reason: format!("must be between 1 and {}", MAX_SUGGESTIONS),
            });
        }

        for (field, url) in [
            ("tmdb.base_url", &self.tmdb.base_url),
            ("tmdb.image_base_url", &self.tmdb.image_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidSetting {
                    field,
                    reason: format!("'{}' is not an http(s) URL", url),
                });
            }
        }

        Ok(())
    }

    /// The API key to use, preferring the environment over the config file.
    /// Empty values and the placeholder count as unset.
    pub fn resolved_api_key(&self) -> Option<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        Self::pick_api_key(from_env.as_deref(), &self.tmdb.api_key)
    }

    fn pick_api_key(from_env: Option<&str>, from_file: &str) -> Option<String> {
        [from_env.unwrap_or_default(), from_file]
            .into_iter()
            .map(str::trim)
            .find(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
            .map(str::to_string)
    }

    pub fn is_api_key_configured(&self) -> bool {
        self.resolved_api_key().is_some()
    }
}
