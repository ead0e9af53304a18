// Application Configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// City name shown in logs and reports
    #[serde(default = "default_location")]
    pub location: String,

    /// Collector sampling interval in seconds
    #[serde(default = "default_collector_interval")]
    pub collector_interval_secs: u64,

    /// Analysis cycle interval in seconds
    #[serde(default = "default_analysis_interval")]
    pub analysis_interval_secs: u64,

    /// Backoff after a failed analysis cycle in seconds
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,

    /// Historical window fed into each analysis, in hours
    #[serde(default = "default_hours_back")]
    pub hours_back: i64,

    /// Forecast horizon in hours
    #[serde(default = "default_forecast_hours")]
    pub forecast_hours: i64,

    /// Composite score a forecast point needs to join an optimal window
    #[serde(default = "default_min_window_score")]
    pub min_window_score: f64,

    /// Minimum optimal-window duration in hours
    #[serde(default = "default_min_window_duration")]
    pub min_window_duration_hours: f64,

    /// Forecast cadence in hours
    #[serde(default = "default_forecast_interval")]
    pub forecast_interval_hours: f64,

    /// Days of raw samples kept in the store
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    /// Path to config file (for reference)
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_location() -> String { "Dublin".to_string() }
fn default_collector_interval() -> u64 { 60 }
fn default_analysis_interval() -> u64 { 30 }
fn default_error_backoff() -> u64 { 10 }
fn default_hours_back() -> i64 { 24 }
fn default_forecast_hours() -> i64 { 48 }
fn default_min_window_score() -> f64 { 70.0 }
fn default_min_window_duration() -> f64 { 3.0 }
fn default_forecast_interval() -> f64 { 3.0 }
fn default_retention_days() -> i64 { 7 }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            collector_interval_secs: default_collector_interval(),
            analysis_interval_secs: default_analysis_interval(),
            error_backoff_secs: default_error_backoff(),
            hours_back: default_hours_back(),
            forecast_hours: default_forecast_hours(),
            min_window_score: default_min_window_score(),
            min_window_duration_hours: default_min_window_duration(),
            forecast_interval_hours: default_forecast_interval(),
            retention_days: default_retention_days(),
            config_path: PathBuf::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from standard paths
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("/etc/fairweather/config.toml"),
            dirs::config_dir()
                .map(|p| p.join("fairweather/config.toml"))
                .unwrap_or_default(),
            PathBuf::from("./config.toml"),
        ];

        for path in &config_paths {
            if path.exists() {
                return Self::load_from(path);
            }
        }

        // Return default config
        tracing::warn!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.config_path = path.clone();
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Generate example configuration
    pub fn example() -> String {
        let config = Self {
            location: "Dublin".to_string(),
            ..Default::default()
        };

        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Helper for getting config directories
mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_cadence() {
        let config = AppConfig::default();
        assert_eq!(config.analysis_interval_secs, 30);
        assert_eq!(config.error_backoff_secs, 10);
        assert_eq!(config.hours_back, 24);
        assert_eq!(config.forecast_hours, 48);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: AppConfig = toml::from_str("location = \"Cork\"\nhours_back = 48\n").unwrap();
        assert_eq!(config.location, "Cork");
        assert_eq!(config.hours_back, 48);
        assert_eq!(config.analysis_interval_secs, 30);
    }

    #[test]
    fn example_round_trips() {
        let parsed: AppConfig = toml::from_str(&AppConfig::example()).unwrap();
        assert_eq!(parsed.location, "Dublin");
    }
}
