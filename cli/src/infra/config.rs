//! Loads `SetliveConfig` from its YAML file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::config::{DEFAULT_CONFIG_PATH, SetliveConfig};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SETLIVE_CONFIG";

/// Production config source backed by a YAML file on disk.
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Resolve the config path: explicit argument, then `SETLIVE_CONFIG`,
    /// then `/etc/setlive.yaml`.
    #[must_use]
    pub fn locate(explicit: Option<PathBuf>) -> Self {
        let path = explicit
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::new(path)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, falling back to defaults when the file is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<SetliveConfig> {
        if !self.path.exists() {
            return Ok(SetliveConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(SetliveConfig::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))
    }
}
