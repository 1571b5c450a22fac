//! Configuration for the paddock CLI.

use serde::{Deserialize, Serialize};

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path; parent directories are created on first open.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/paddock.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Simulated feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Races per fetch when the CLI flag is absent.
    #[serde(default = "default_max_races")]
    pub max_races: usize,
    /// How far ahead generated race dates may land, in days.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
}

fn default_max_races() -> usize {
    10
}

fn default_horizon_days() -> i64 {
    7
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_races: default_max_races(),
            horizon_days: default_horizon_days(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

impl AppConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Add config file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (PADDOCK_STORAGE_PATH, etc.)
            .add_source(
                config::Environment::with_prefix("PADDOCK")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage.path, "data/paddock.db");
        assert_eq!(config.simulator.max_races, 10);
        assert_eq!(config.simulator.horizon_days, 7);
    }
}
