//! Scenario loading, parsing, and validation logic.
//!
//! A scenario file is JSON describing what to plan: the radio profile to
//! sweep, optional user-defined profiles, the link configuration for the MCS
//! sweep and the parameters for a fixed-distance link budget.

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;

use crate::engine::{LinkBudgetParams, LinkConfiguration, RadioProfile, RadioProfileCatalog};

/// Error type for scenario loading failures.
#[derive(Debug)]
pub enum ScenarioLoadError {
    FileReadError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ScenarioLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioLoadError::FileReadError(msg) => write!(f, "Failed to read file: {}", msg),
            ScenarioLoadError::ParseError(msg) => write!(f, "Failed to parse JSON: {}", msg),
            ScenarioLoadError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ScenarioLoadError {}

/// Root structure of a scenario file.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Radio profile to sweep. Falls back to the configured default profile.
    #[serde(default)]
    pub profile: Option<String>,
    /// Extra radio profiles added to the built-in catalog.
    #[serde(default)]
    pub custom_profiles: Vec<RadioProfile>,
    /// Link configuration for the MCS sweep.
    #[serde(default)]
    pub link: Option<LinkConfiguration>,
    /// Parameters for the fixed-distance link budget.
    #[serde(default)]
    pub budget: Option<LinkBudgetParams>,
}

impl Scenario {
    /// Built-in catalog extended with this scenario's custom profiles.
    pub fn catalog(&self) -> Result<RadioProfileCatalog, String> {
        let mut catalog = RadioProfileCatalog::builtin();
        for profile in &self.custom_profiles {
            catalog.insert(profile.clone()).map_err(|e| e.to_string())?;
        }
        Ok(catalog)
    }
}

/// Load and parse a scenario from a file.
///
/// # Parameters
///
/// * `path` - Path to the scenario JSON file
///
/// # Returns
///
/// Parsed and validated Scenario or an error.
pub fn load_scenario(path: &str) -> Result<Scenario, ScenarioLoadError> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path))
        .map_err(|e| ScenarioLoadError::FileReadError(e.to_string()))?;

    let scenario: Scenario = serde_json::from_str(&data)
        .context("Invalid JSON format")
        .map_err(|e| ScenarioLoadError::ParseError(format!("{:#}", e)))?;

    validate_scenario(&scenario).map_err(ScenarioLoadError::ValidationError)?;

    Ok(scenario)
}

/// Validate a parsed scenario.
///
/// # Returns
///
/// `Ok(())` if validation passes, `Err(String)` with error description otherwise.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), String> {
    if scenario.link.is_none() && scenario.budget.is_none() {
        return Err("Scenario must contain a 'link' or a 'budget' section".to_string());
    }

    let mut names = HashSet::new();
    for profile in &scenario.custom_profiles {
        if !names.insert(profile.name.as_str()) {
            return Err(format!("Duplicate custom profile name: {}", profile.name));
        }
        profile.validate().map_err(|e| e.to_string())?;
    }

    if let Some(link) = &scenario.link {
        link.validate().map_err(|e| format!("link: {}", e))?;
        if let Some(name) = &scenario.profile {
            let known = RadioProfileCatalog::builtin().get(name).is_ok() || names.contains(name.as_str());
            if !known {
                return Err(format!("Unknown radio profile '{}'", name));
            }
        }
    }

    if let Some(budget) = &scenario.budget {
        budget.validate().map_err(|e| format!("budget: {}", e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const LINK_AND_BUDGET: &str = r#"{
        "profile": "Mini-OEM",
        "link": {
            "frequency_mhz": 2450,
            "bandwidth_mhz": 20,
            "antenna_count": 2,
            "data_streams": 2,
            "antenna_gain_dbi": 6,
            "fade_margin_db": 10,
            "power_limit_dbm": 33,
            "telemetry_kbps": 50,
            "video_mbps": 3,
            "height_agl": { "value": 400, "unit": "feet" }
        },
        "budget": {
            "distance_km": 5,
            "frequency_ghz": 2.45,
            "tx_height_m": 3,
            "rx_height_m": 3
        }
    }"#;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("radio-link-planner-{}-{}.json", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_link_and_budget_sections() {
        let path = write_temp("full", LINK_AND_BUDGET);
        let scenario = load_scenario(path.to_str().unwrap()).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(scenario.profile.as_deref(), Some("Mini-OEM"));
        let link = scenario.link.unwrap();
        assert!((link.height_agl.to_meters() - 121.92).abs() < 1e-9);
        assert_eq!(link.frame_aggregation_count, 10);
        let budget = scenario.budget.unwrap();
        assert_eq!(budget.distance_km, 5.0);
        assert_eq!(budget.tx_power_dbm, 20.0);
        assert_eq!(budget.mimo_streams, 1);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_scenario("/nonexistent/radio-link-planner/scenario.json").unwrap_err();
        assert!(matches!(err, ScenarioLoadError::FileReadError(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let path = write_temp("malformed", "{ \"link\": ");
        let err = load_scenario(path.to_str().unwrap()).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, ScenarioLoadError::ParseError(_)));
    }

    #[test]
    fn empty_scenario_fails_validation() {
        let path = write_temp("empty", "{}");
        let err = load_scenario(path.to_str().unwrap()).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, ScenarioLoadError::ValidationError(_)));
        assert!(err.to_string().starts_with("Validation error"));
    }

    #[test]
    fn invalid_link_and_unknown_profile_are_rejected() {
        let bad_bandwidth = LINK_AND_BUDGET.replace("\"bandwidth_mhz\": 20", "\"bandwidth_mhz\": 80");
        let scenario: Scenario = serde_json::from_str(&bad_bandwidth).unwrap();
        assert!(validate_scenario(&scenario).unwrap_err().starts_with("link:"));

        let unknown = LINK_AND_BUDGET.replace("Mini-OEM", "Ghost");
        let scenario: Scenario = serde_json::from_str(&unknown).unwrap();
        assert!(validate_scenario(&scenario).unwrap_err().contains("Ghost"));
    }

    #[test]
    fn custom_profiles_extend_catalog() {
        let json = r#"{
            "profile": "Bench",
            "custom_profiles": [{
                "name": "Bench",
                "power": [20, 20, 20, 20, 19, 18, 17, 16],
                "sensitivity": [-90, -88, -86, -84, -80, -76, -74, -72],
                "max_tx_power": 20
            }],
            "budget": {}
        }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        validate_scenario(&scenario).unwrap();
        let catalog = scenario.catalog().unwrap();
        assert!(catalog.get("Bench").is_ok());
        assert!(catalog.get("Mini-OEM").is_ok());
    }
}
