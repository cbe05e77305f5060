//! Vault configuration
//!
//! A small JSON file at the vault root points the tool at the schemas
//! directory, the property bank, and an optional registry index. Every field
//! has a default so an empty `{}` file (or defaults alone) is a working
//! configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Tool configuration, deserialized from `stela.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vault root; relative paths below resolve against it
    #[serde(default = "default_vault_root")]
    pub vault_root: PathBuf,

    /// Directory containing one schema per `.json` file
    #[serde(default = "default_schemas_dir")]
    pub schemas_dir: PathBuf,

    /// Property bank file with reusable property definitions
    #[serde(default = "default_property_bank")]
    pub property_bank: PathBuf,

    /// Where to persist the registry index after a successful check;
    /// absent means no persistence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_index: Option<PathBuf>,
}

fn default_vault_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_schemas_dir() -> PathBuf {
    PathBuf::from("schemas")
}

fn default_property_bank() -> PathBuf {
    PathBuf::from("schemas/properties.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_root: default_vault_root(),
            schemas_dir: default_schemas_dir(),
            property_bank: default_property_bank(),
            registry_index: None,
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file. A missing file falls back to
    /// defaults; a present but broken file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Schemas directory resolved against the vault root.
    pub fn schemas_path(&self) -> PathBuf {
        self.resolve(&self.schemas_dir)
    }

    /// Property bank file resolved against the vault root.
    pub fn property_bank_path(&self) -> PathBuf {
        self.resolve(&self.property_bank)
    }

    /// Registry index file resolved against the vault root, when configured.
    pub fn registry_index_path(&self) -> Option<PathBuf> {
        self.registry_index.as_deref().map(|p| self.resolve(p))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.vault_root.join(path)
        }
    }
}
