//! Configuration file support for Lernkarten.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/lernkarten/config.toml`.
//! Every section is optional.

use crate::ident::{IdGenerator, Transliterations};
use crate::import::FingerprintMode;
use crate::{CardCategory, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub ids: IdsConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub review: ReviewConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Id generation configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct IdsConfig {
    /// Extra topic substitutions on top of the German table, e.g. `"é" = "E"`
    #[serde(default)]
    pub transliterations: HashMap<String, String>,
}

/// Import and duplicate detection configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Include the category in fingerprints
    #[serde(default)]
    pub category_aware_fingerprint: bool,

    #[serde(default = "default_category")]
    pub default_category: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            category_aware_fingerprint: false,
            default_category: default_category(),
        }
    }
}

/// Review history configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_history_days")]
    pub history_days: i64,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("lernkarten")
}

fn default_category() -> String {
    CardCategory::default().as_str().to_string()
}

fn default_history_days() -> i64 {
    30
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        if config.review.history_days <= 0 {
            return Err(Error::Config(format!(
                "review.history_days must be positive, got {}",
                config.review.history_days
            )));
        }
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("lernkarten").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Id generator with the configured extra transliterations
    pub fn id_generator(&self) -> Result<IdGenerator> {
        let table = Transliterations::german().extend_from_config(&self.ids.transliterations)?;
        Ok(IdGenerator::new(table))
    }

    pub fn fingerprint_mode(&self) -> FingerprintMode {
        if self.import.category_aware_fingerprint {
            FingerprintMode::CategoryAware
        } else {
            FingerprintMode::Basic
        }
    }

    pub fn default_category(&self) -> CardCategory {
        CardCategory::from(self.import.default_category.clone())
    }
}
