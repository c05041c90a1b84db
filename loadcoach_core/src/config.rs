//! Configuration file support for Loadcoach.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/loadcoach/config.toml`.

use crate::cold_start::{DEFAULT_BODY_WEIGHT, DEFAULT_COLD_START_REPS};
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::suggest::DEFAULT_MICRO_INCREMENT;
use crate::{Error, RepRange, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub suggestion: SuggestionConfig,
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

/// Suggestion parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestionConfig {
    #[serde(default = "default_target_reps_low")]
    pub target_reps_low: u32,

    #[serde(default = "default_target_reps_high")]
    pub target_reps_high: u32,

    /// Smallest load step the lifter's equipment allows (kg)
    #[serde(default = "default_micro_increment")]
    pub micro_increment: f64,

    /// Sets read back per exercise
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_cold_start_target_reps")]
    pub cold_start_target_reps: u32,

    /// Used for cold starts when no body weight is known
    #[serde(default = "default_body_weight_kg")]
    pub default_body_weight_kg: f64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            target_reps_low: default_target_reps_low(),
            target_reps_high: default_target_reps_high(),
            micro_increment: default_micro_increment(),
            history_limit: default_history_limit(),
            cold_start_target_reps: default_cold_start_target_reps(),
            default_body_weight_kg: default_body_weight_kg(),
        }
    }
}

impl SuggestionConfig {
    pub fn target_rep_range(&self) -> RepRange {
        RepRange::new(self.target_reps_low, self.target_reps_high)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("loadcoach")
}

fn default_target_reps_low() -> u32 {
    RepRange::default().low
}

fn default_target_reps_high() -> u32 {
    RepRange::default().high
}

fn default_micro_increment() -> f64 {
    DEFAULT_MICRO_INCREMENT
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_cold_start_target_reps() -> u32 {
    DEFAULT_COLD_START_REPS
}

fn default_body_weight_kg() -> f64 {
    DEFAULT_BODY_WEIGHT
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
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
        base.join("loadcoach").join("config.toml")
    }

    /// Reject values the suggestion engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let s = &self.suggestion;

        if s.target_reps_low == 0 {
            return Err(Error::Config("target_reps_low must be at least 1".into()));
        }
        if s.target_reps_low > s.target_reps_high {
            return Err(Error::Config(format!(
                "target_reps_low ({}) exceeds target_reps_high ({})",
                s.target_reps_low, s.target_reps_high
            )));
        }
        if !s.micro_increment.is_finite() || s.micro_increment <= 0.0 {
            return Err(Error::Config(format!(
                "micro_increment must be positive, got {}",
                s.micro_increment
            )));
        }
        if s.history_limit == 0 {
            return Err(Error::Config("history_limit must be at least 1".into()));
        }
        if !s.default_body_weight_kg.is_finite() || s.default_body_weight_kg <= 0.0 {
            return Err(Error::Config(format!(
                "default_body_weight_kg must be positive, got {}",
                s.default_body_weight_kg
            )));
        }

        Ok(())
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
}
