//! Planner settings loaded from `config.toml`.

use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Log verbosity selectable from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

/// How the driver prints results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn default_profile() -> String {
    "Mini-OEM".to_string()
}

/// Settings for the command-line driver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlannerConfig {
    /// Radio profile used when a scenario does not name one
    #[serde(default = "default_profile")]
    pub default_profile: String,
    /// Verbosity for this crate's log output
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_profile: default_profile(),
            log_level: LogLevel::default(),
            output_format: OutputFormat::default(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the config.toml file
    ///
    /// # Returns
    /// * `Ok(PlannerConfig)` if the file was successfully loaded and parsed
    /// * `Err(String)` with a descriptive error message otherwise
    pub fn load(config_path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(config_path).map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Derive the config path from a scenario file path.
    ///
    /// Replaces the scenario filename with "config.toml" in the same directory.
    pub fn config_path_from_scenario(scenario_path: &str) -> PathBuf {
        let scenario = Path::new(scenario_path);
        scenario.parent().unwrap_or(Path::new(".")).join("config.toml")
    }
}
