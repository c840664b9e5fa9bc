//! Configuration
//!
//! Loaded with a two-layer resolution:
//! 1. Embedded defaults (`config/mander.toml`, compiled into the binary)
//! 2. Overrides from an explicit path, or `~/.local/share/mander/config.toml`
//!
//! Override files only need the keys they change.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const DEFAULT_CONFIG: &str = include_str!("../../../config/mander.toml");

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub storage: StorageConfig,
    pub user: UserConfig,
    pub view: ViewConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageConfig {
    pub path: String,
    pub encrypt: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserConfig {
    pub default_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// `None` means unlimited
    pub default_limit: Option<usize>,
    pub newest_first: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                path: "mander.db".to_string(),
                encrypt: true,
            },
            user: UserConfig {
                default_id: "default".to_string(),
            },
            view: ViewConfig {
                default_limit: Some(50),
                newest_first: true,
            },
        }
    }
}

impl Config {
    /// Embedded defaults, then the override file if one exists
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_toml(DEFAULT_CONFIG)?;

        let path = match override_path {
            Some(path) if path.exists() => Some(path.to_path_buf()),
            Some(path) => {
                warn!(
                    "Config file {} not found, using defaults",
                    path.display()
                );
                None
            }
            None => default_config_path().filter(|p| p.exists()),
        };

        if let Some(path) = path {
            debug!("Loading config overrides from {}", path.display());
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::InvalidData(format!("Failed to read config {}: {}", path.display(), e))
            })?;
            config.apply(toml::from_str(&content)?);
        }

        Ok(config)
    }

    /// Parse a full or partial config on top of [`Config::default`]
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config = Self::default();
        config.apply(toml::from_str(content)?);
        Ok(config)
    }

    fn apply(&mut self, raw: RawConfig) {
        if let Some(storage) = raw.storage {
            if let Some(path) = storage.path {
                self.storage.path = path;
            }
            if let Some(encrypt) = storage.encrypt {
                self.storage.encrypt = encrypt;
            }
        }
        if let Some(user) = raw.user {
            if let Some(id) = user.default_id.filter(|id| !id.trim().is_empty()) {
                self.user.default_id = id;
            }
        }
        if let Some(view) = raw.view {
            if let Some(limit) = view.default_limit {
                self.view.default_limit = (limit > 0).then_some(limit);
            }
            if let Some(newest_first) = view.newest_first {
                self.view.newest_first = newest_first;
            }
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("mander").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    storage: Option<RawStorage>,
    user: Option<RawUser>,
    view: Option<RawView>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStorage {
    path: Option<String>,
    encrypt: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUser {
    default_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawView {
    default_limit: Option<usize>,
    newest_first: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse() {
        let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r#"
            [storage]
            encrypt = false

            [view]
            default_limit = 0
            "#,
        )
        .unwrap();

        assert!(!config.storage.encrypt);
        assert_eq!(config.storage.path, "mander.db");
        assert_eq!(config.view.default_limit, None);
        assert_eq!(config.user.default_id, "default");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            Config::from_toml("[storage]\ncolor = \"blue\"\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[user]\ndefault_id = \"alice\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.user.default_id, "alice");
        assert!(config.storage.encrypt);
    }

    #[test]
    fn test_missing_explicit_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }
}
