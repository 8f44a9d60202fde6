//! Configuration management for the Zenith engine host.
//!
//! This module handles loading and validation of the engine configuration
//! from TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Main loop settings
    #[serde(default)]
    pub engine: EngineSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Main loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Tick interval in milliseconds (0 runs ticks back to back)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Time budget for draining the event queue each tick (0 means no limit)
    #[serde(default)]
    pub execute_timeout_ms: u64,
    /// Number of ticks to run before quitting (0 runs until a quit event)
    #[serde(default)]
    pub max_ticks: u64,
}

/// Logging system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

/// Default tick interval for serde deserialization
fn default_tick_interval() -> u64 {
    16 // ~60 ticks per second
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            execute_timeout_ms: 0,
            max_ticks: 0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl EngineSettings {
    pub fn tick_interval(&self) -> Option<Duration> {
        (self.tick_interval_ms > 0).then(|| Duration::from_millis(self.tick_interval_ms))
    }

    /// Drain budget handed to `EventManager::execute`, `None` for no limit.
    pub fn execute_timeout(&self) -> Option<Duration> {
        (self.execute_timeout_ms > 0).then(|| Duration::from_millis(self.execute_timeout_ms))
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the
    /// specified path and returns the default configuration.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: AppConfig = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)
                .context("Failed to serialize default configuration")?;
            tokio::fs::write(path, toml_content)
                .await
                .with_context(|| format!("Failed to write default config {}", path.display()))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or an error string describing the issue.
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        let engine = &self.engine;
        if engine.tick_interval_ms > 0
            && engine.execute_timeout_ms > 0
            && engine.execute_timeout_ms > engine.tick_interval_ms
        {
            return Err(format!(
                "execute_timeout_ms ({}) cannot exceed tick_interval_ms ({})",
                engine.execute_timeout_ms, engine.tick_interval_ms
            ));
        }

        Ok(())
    }
}
