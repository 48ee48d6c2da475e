//! Runtime settings, read from TOML with environment overrides.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_REDIS_URL: &str = "REDIS_URL";
pub const ENV_KEY_PREFIX: &str = "PRICETALK_KEY_PREFIX";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub redis: RedisSettings,
    pub cascade: CascadePolicy,
    pub limits: TextLimits,
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads `path` and applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut settings = Self::from_toml_str(&text)?;
        settings.apply_env();
        Ok(settings)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_REDIS_URL).filter(|v| !v.is_empty()) {
            self.redis.url = url;
        }
        if let Some(prefix) = lookup(ENV_KEY_PREFIX).filter(|v| !v.is_empty()) {
            self.redis.key_prefix = prefix;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    pub url: String,
    pub key_prefix: String,
    pub service: String,
    /// Optimistic write attempts before giving up with a contention error.
    pub max_write_retries: u32,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1/".to_string(),
            key_prefix: "pricetalk".to_string(),
            service: "engage".to_string(),
            max_write_retries: 16,
        }
    }
}

/// How deletions propagate through the thread tree.
///
/// Defaults keep the observed behaviour: a deleted comment's id stays on its post, and
/// replies survive the deletion of their comment or post. Reply deletion always prunes
/// the reply id from its comment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadePolicy {
    /// Remove a deleted comment's id from its post in the same write.
    pub prune_deleted_comments: bool,
    /// Delete the replies of every deleted comment.
    pub delete_orphan_replies: bool,
}

/// Upper bounds on text fields, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLimits {
    pub title_max: usize,
    pub text_max: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            title_max: 200,
            text_max: 5000,
        }
    }
}
