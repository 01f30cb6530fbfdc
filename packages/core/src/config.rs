//! Site configuration
//!
//! `SiteConfig` is read from a JSON file when one exists; every field has a
//! default, so partial files (or no file) are fine. Two environment variables
//! override the file for deployments and tests:
//!
//! - `SCHOOLSITE_DATA_PATH` - location of the node document
//! - `SCHOOLSITE_BIND_ADDR` - address the admin API listens on

use crate::tree::{HiddenNodePolicy, DEFAULT_WALK_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

pub const DATA_PATH_ENV: &str = "SCHOOLSITE_DATA_PATH";
pub const BIND_ADDR_ENV: &str = "SCHOOLSITE_BIND_ADDR";

/// Domain event channel capacity (subscribers lagging further miss events)
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 128;

/// What happens to the children of a deleted node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Children keep their now-dangling parent reference and render as roots
    #[default]
    LeaveDangling,
    /// Children's parent reference is cleared in the same write
    PromoteToRoot,
    /// The whole subtree is deleted
    Cascade,
    /// Deletion is refused while children exist
    Restrict,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/site.json")
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_walk_limit() -> usize {
    DEFAULT_WALK_LIMIT
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

/// Runtime settings for the site core and the admin server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    /// JSON document holding every node
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    /// Admin API listen address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default)]
    pub orphan_policy: OrphanPolicy,

    /// Menu treatment of visible nodes under hidden ones
    #[serde(default)]
    pub hidden_policy: HiddenNodePolicy,

    /// Upper bound on ancestor walks during cycle checks
    #[serde(default = "default_walk_limit")]
    pub ancestor_walk_limit: usize,

    #[serde(default = "default_event_capacity")]
    pub event_channel_capacity: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            bind_addr: default_bind_addr(),
            orphan_policy: OrphanPolicy::default(),
            hidden_policy: HiddenNodePolicy::default(),
            ancestor_walk_limit: default_walk_limit(),
            event_channel_capacity: default_event_capacity(),
        }
    }
}

impl SiteConfig {
    /// Load from `path`, falling back to defaults when the file does not exist
    ///
    /// Environment overrides are applied afterwards and the result is
    /// validated.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config = match fs::read_to_string(path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Save to `path` using write-to-temp-then-rename
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(io_err)?;
        }

        let serialized = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let temp_file = path.with_extension("json.tmp");
        fs::write(&temp_file, serialized).await.map_err(io_err)?;
        fs::rename(&temp_file, path).await.map_err(io_err)?;

        Ok(())
    }

    /// Apply `SCHOOLSITE_DATA_PATH` / `SCHOOLSITE_BIND_ADDR` when set and non-empty
    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = non_empty_env(DATA_PATH_ENV) {
            self.data_path = PathBuf::from(path);
        }
        if let Some(addr) = non_empty_env(BIND_ADDR_ENV) {
            self.bind_addr = addr;
        }
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ancestor_walk_limit == 0 {
            return Err(ConfigError::Invalid(
                "ancestorWalkLimit must be at least 1".to_string(),
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "eventChannelCapacity must be at least 1".to_string(),
            ));
        }
        if self.data_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("dataPath must not be empty".to_string()));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();

        assert_eq!(config.orphan_policy, OrphanPolicy::LeaveDangling);
        assert_eq!(config.hidden_policy, HiddenNodePolicy::Skip);
        assert_eq!(config.ancestor_walk_limit, 1000);
        assert_eq!(config.event_channel_capacity, 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: SiteConfig = serde_json::from_value(json!({
            "orphanPolicy": "cascade",
            "hiddenPolicy": "splice_children"
        }))
        .unwrap();

        assert_eq!(config.orphan_policy, OrphanPolicy::Cascade);
        assert_eq!(config.hidden_policy, HiddenNodePolicy::SpliceChildren);
        assert_eq!(config.data_path, PathBuf::from("data/site.json"));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = SiteConfig {
            ancestor_walk_limit: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = SiteConfig {
            event_channel_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config").join("site-config.json");

        let config = SiteConfig {
            orphan_policy: OrphanPolicy::Restrict,
            ancestor_walk_limit: 50,
            ..Default::default()
        };
        config.save(&path).await.unwrap();

        let loaded = SiteConfig::load(&path).await.unwrap();
        assert_eq!(loaded.orphan_policy, OrphanPolicy::Restrict);
        assert_eq!(loaded.ancestor_walk_limit, 50);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_load_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("site-config.json");
        std::fs::write(&path, "orphanPolicy = cascade").unwrap();

        let err = SiteConfig::load(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
