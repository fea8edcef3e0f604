//! Configuration for sieve persistence.
//!
//! SIEVE_ROOT resolution order:
//! 1. Explicit path passed to Config::with_root()
//! 2. SIEVE_ROOT environment variable
//! 3. Default: platform data directory (~/.local/share/sieve on Linux)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "filter-toolbar-filters";

/// sieve configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for persisted filter sets.
    pub storage_root: PathBuf,

    /// Key under which the storage adapter keeps its filter list.
    ///
    /// Two toolbars sharing a root must use different keys unless they are
    /// meant to share state.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Config {
    /// Create a new config with the given SIEVE_ROOT.
    pub fn with_root(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            storage_key: default_storage_key(),
        }
    }

    /// Use a different storage key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Create a config using default SIEVE_ROOT resolution.
    pub fn default_location() -> Result<Self> {
        let storage_root = resolve_storage_root()?;
        Ok(Self::with_root(storage_root))
    }

    /// Load config from SIEVE_ROOT/config.toml, or create default.
    pub fn load() -> Result<Self> {
        let storage_root = resolve_storage_root()?;
        Self::load_from(&storage_root)
    }

    /// Load config from a specific SIEVE_ROOT.
    pub fn load_from(storage_root: &Path) -> Result<Self> {
        let config_path = storage_root.join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
            // The root is wherever the file was found, not what it claims
            config.storage_root = storage_root.to_path_buf();
            Ok(config)
        } else {
            Ok(Self::with_root(storage_root))
        }
    }

    /// Save config to SIEVE_ROOT/config.toml.
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.storage_root)?;
        let config_path = self.storage_root.join("config.toml");
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(config_path, contents)?;
        Ok(())
    }

    /// Directory holding one file per storage key.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_root.join("filters")
    }
}

/// Resolve SIEVE_ROOT using the standard resolution order.
fn resolve_storage_root() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("SIEVE_ROOT") {
        return Ok(PathBuf::from(path));
    }

    if let Some(proj_dirs) = ProjectDirs::from("", "", "sieve") {
        return Ok(proj_dirs.data_dir().to_path_buf());
    }

    let home = std::env::var("HOME")
        .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;
    Ok(PathBuf::from(home).join(".local/share/sieve"))
}
