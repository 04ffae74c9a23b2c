//! Main application configuration
//!
//! This module defines the primary configuration structures for the ladder,
//! including environment variable loading, TOML files and validation.

use crate::config::rating::RatingConfig;
use crate::pairing::SchedulerConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub rating: RatingConfig,
    pub pairing: SchedulerConfig,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Club name shown in output and logs
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Where club data lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// JSON document holding players and match history
    pub data_file: PathBuf,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "padel-ladder".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("padel-ladder.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load a TOML file, then let environment variables override it
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("LADDER_SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Storage settings
        if let Ok(path) = env::var("LADDER_DATA_FILE") {
            self.storage.data_file = PathBuf::from(path);
        }

        // Rating settings
        if let Ok(policy) = env::var("LADDER_RATING_POLICY") {
            self.rating.policy = policy
                .parse()
                .map_err(|e| anyhow!("Invalid LADDER_RATING_POLICY value: {}", e))?;
        }
        if let Ok(baseline) = env::var("LADDER_BASELINE_RATING") {
            self.rating.baseline_rating = baseline
                .parse()
                .map_err(|_| anyhow!("Invalid LADDER_BASELINE_RATING value: {}", baseline))?;
        }
        if let Ok(unknown) = env::var("LADDER_UNKNOWN_PLAYER") {
            self.rating.unknown_player = unknown
                .parse()
                .map_err(|e| anyhow!("Invalid LADDER_UNKNOWN_PLAYER value: {}", e))?;
        }
        if let Ok(multiplier) = env::var("LADDER_UNDERDOG_MULTIPLIER") {
            self.rating.underdog_multiplier = Some(multiplier.parse().map_err(|_| {
                anyhow!("Invalid LADDER_UNDERDOG_MULTIPLIER value: {}", multiplier)
            })?);
        }
        if let Ok(seed) = env::var("LADDER_SEED_RATING") {
            self.rating.seed_rating = seed
                .parse()
                .map_err(|_| anyhow!("Invalid LADDER_SEED_RATING value: {}", seed))?;
        }

        // Pairing settings
        if let Ok(prefix) = env::var("LADDER_MATCH_ID_PREFIX") {
            self.pairing.match_id_prefix = prefix;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.trim().is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    if config.storage.data_file.as_os_str().is_empty() {
        return Err(anyhow!("Data file path cannot be empty"));
    }

    if !config.rating.seed_rating.is_finite() {
        return Err(anyhow!("Seed rating must be finite"));
    }

    if config.pairing.match_id_prefix.is_empty() {
        return Err(anyhow!("Match id prefix cannot be empty"));
    }

    // Builds and validates the K curve, margin curve and multipliers
    config.rating.to_policy()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::policy::{PolicyPreset, UnknownPlayerPolicy};

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.pairing.match_id_prefix, "g");
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_rating_settings() {
        let mut config = AppConfig::default();
        config.rating.baseline_rating = f64::INFINITY;
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.pairing.match_id_prefix.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_partial_toml() {
        let raw = r#"
            [service]
            name = "Friday Padel"

            [rating]
            policy = "rounded"
            unknown_player = "reject"
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.service.name, "Friday Padel");
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.rating.policy, PolicyPreset::Rounded);
        assert_eq!(config.rating.unknown_player, UnknownPlayerPolicy::Reject);
        assert_eq!(config.rating.baseline_rating, 1500.0);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("padel-ladder-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[storage]\ndata_file = \"club.json\"\n[pairing]\nmatch_id_prefix = \"court-\"\n",
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.pairing.match_id_prefix, "court-");

        std::fs::remove_file(&path).unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }
}
