//! Radio hardware profiles and the catalog they are looked up from.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::types::{BASE_MCS_COUNT, BASE_MCS_TABLE, EngineError, McsCharacteristics, Modulation};

fn default_mcs_table() -> [McsCharacteristics; BASE_MCS_COUNT] {
    BASE_MCS_TABLE
}

/// Per-MCS transmit power and sensitivity of one radio variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioProfile {
    pub name: String,
    /// Transmit power (dBm) per base MCS index.
    pub power: [f64; BASE_MCS_COUNT],
    /// Receiver sensitivity (dBm) per base MCS index.
    pub sensitivity: [f64; BASE_MCS_COUNT],
    #[serde(default = "default_mcs_table")]
    pub mcs: [McsCharacteristics; BASE_MCS_COUNT],
    pub max_tx_power: f64,
    #[serde(default)]
    pub supported_frequencies_mhz: Vec<f64>,
}

impl RadioProfile {
    fn builtin(name: &str, power: [f64; BASE_MCS_COUNT], sensitivity: [f64; BASE_MCS_COUNT], max_tx_power: f64, frequencies: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            power,
            sensitivity,
            mcs: BASE_MCS_TABLE,
            max_tx_power,
            supported_frequencies_mhz: frequencies.to_vec(),
        }
    }

    pub fn modulation(&self, index: usize) -> Modulation {
        self.mcs[index].modulation
    }

    pub fn coding_rate(&self, index: usize) -> f64 {
        self.mcs[index].coding_rate
    }

    pub fn bits_per_symbol(&self, index: usize) -> u32 {
        self.mcs[index].bits_per_symbol
    }

    pub fn supports_frequency(&self, freq_mhz: f64) -> bool {
        self.supported_frequencies_mhz.iter().any(|f| (f - freq_mhz).abs() < 1e-9)
    }

    /// Validate a profile that did not come from the built-in table.
    ///
    /// Sensitivity must not decrease with MCS index: a more robust MCS never
    /// needs a stronger signal.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidConfiguration("radio profile name is empty".to_string()));
        }
        if !self.max_tx_power.is_finite() {
            return Err(EngineError::InvalidConfiguration(format!("profile {}: max_tx_power must be finite", self.name)));
        }
        for i in 0..BASE_MCS_COUNT {
            let (power, sensitivity) = (self.power[i], self.sensitivity[i]);
            if !power.is_finite() || !sensitivity.is_finite() {
                return Err(EngineError::InvalidConfiguration(format!("profile {}: MCS {} has non-finite power or sensitivity", self.name, i)));
            }
            if power > self.max_tx_power {
                return Err(EngineError::InvalidConfiguration(format!(
                    "profile {}: MCS {} power {} dBm exceeds max_tx_power {} dBm",
                    self.name, i, power, self.max_tx_power
                )));
            }
            let characteristics = &self.mcs[i];
            if !(characteristics.coding_rate > 0.0 && characteristics.coding_rate <= 1.0) || characteristics.bits_per_symbol == 0 {
                return Err(EngineError::InvalidConfiguration(format!("profile {}: MCS {} has invalid coding metadata", self.name, i)));
            }
        }
        if let Some(i) = (1..BASE_MCS_COUNT).find(|&i| self.sensitivity[i] < self.sensitivity[i - 1]) {
            return Err(EngineError::InvalidConfiguration(format!(
                "profile {}: sensitivity at MCS {} ({} dBm) is lower than at MCS {} ({} dBm)",
                self.name,
                i,
                self.sensitivity[i],
                i - 1,
                self.sensitivity[i - 1]
            )));
        }
        if self.supported_frequencies_mhz.iter().any(|f| !(f.is_finite() && *f > 0.0)) {
            return Err(EngineError::InvalidConfiguration(format!("profile {}: supported frequencies must be positive", self.name)));
        }
        Ok(())
    }
}

/// Read-only set of radio profiles, keyed by name.
#[derive(Debug, Clone)]
pub struct RadioProfileCatalog {
    profiles: Vec<RadioProfile>,
}

impl RadioProfileCatalog {
    /// Catalog with the built-in hardware variants.
    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                RadioProfile::builtin(
                    "Mini-OEM",
                    [27.0, 26.0, 26.0, 26.0, 25.0, 24.0, 23.0, 21.0],
                    [-87.0, -85.0, -83.0, -81.0, -77.0, -73.0, -71.0, -69.0],
                    30.0,
                    &[915.0, 2450.0, 5200.0, 5800.0],
                ),
                RadioProfile::builtin(
                    "Wearable",
                    [26.0, 25.0, 25.0, 25.0, 24.0, 23.0, 22.0, 20.0],
                    [-86.0, -84.0, -82.0, -80.0, -76.0, -72.0, -70.0, -68.0],
                    29.0,
                    &[2450.0, 5800.0],
                ),
                RadioProfile::builtin(
                    "Embedded",
                    [30.0, 29.0, 29.0, 28.0, 27.0, 26.0, 25.0, 24.0],
                    [-89.0, -87.0, -85.0, -83.0, -79.0, -75.0, -73.0, -71.0],
                    33.0,
                    &[915.0, 1625.0, 2450.0],
                ),
                RadioProfile::builtin(
                    "Helix",
                    [24.0, 23.0, 23.0, 23.0, 22.0, 21.0, 20.0, 18.0],
                    [-88.0, -86.0, -84.0, -82.0, -78.0, -74.0, -72.0, -70.0],
                    27.0,
                    &[2450.0, 5200.0, 5800.0],
                ),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Result<&RadioProfile, EngineError> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| EngineError::UnknownProfile(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Add a validated profile. A profile with the same name is replaced.
    pub fn insert(&mut self, profile: RadioProfile) -> Result<(), EngineError> {
        if let Err(e) = profile.validate() {
            warn!("Rejected radio profile {}: {}", profile.name, e);
            return Err(e);
        }
        if let Some(existing) = self.profiles.iter_mut().find(|p| p.name == profile.name) {
            warn!("Replacing radio profile {}", profile.name);
            *existing = profile;
        } else {
            info!("Added radio profile {}", profile.name);
            self.profiles.push(profile);
        }
        Ok(())
    }
}

impl Default for RadioProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_are_valid() {
        let catalog = RadioProfileCatalog::builtin();
        assert_eq!(catalog.len(), 4);
        for name in catalog.names() {
            catalog.get(name).unwrap().validate().unwrap();
        }
    }

    #[test]
    fn mini_oem_matches_reference_table() {
        let catalog = RadioProfileCatalog::builtin();
        let profile = catalog.get("Mini-OEM").unwrap();
        assert_eq!(profile.power, [27.0, 26.0, 26.0, 26.0, 25.0, 24.0, 23.0, 21.0]);
        assert_eq!(profile.sensitivity, [-87.0, -85.0, -83.0, -81.0, -77.0, -73.0, -71.0, -69.0]);
        assert_eq!(profile.modulation(0), Modulation::Bpsk);
        assert_eq!(profile.bits_per_symbol(7), 6);
        assert!((profile.coding_rate(7) - 5.0 / 6.0).abs() < 1e-12);
        assert!(profile.supports_frequency(2450.0));
        assert!(!profile.supports_frequency(2400.0));
    }

    #[test]
    fn unknown_profile_is_reported() {
        let catalog = RadioProfileCatalog::builtin();
        assert_eq!(catalog.get("Nope").unwrap_err(), EngineError::UnknownProfile("Nope".to_string()));
    }

    #[test]
    fn insert_validates_and_replaces() {
        let mut catalog = RadioProfileCatalog::builtin();
        let mut custom = catalog.get("Helix").unwrap().clone();
        custom.name = "Custom".to_string();
        catalog.insert(custom.clone()).unwrap();
        assert_eq!(catalog.len(), 5);

        custom.power[0] = 26.0;
        catalog.insert(custom.clone()).unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.get("Custom").unwrap().power[0], 26.0);

        let mut bad = custom.clone();
        bad.sensitivity.swap(0, 7);
        assert!(matches!(catalog.insert(bad), Err(EngineError::InvalidConfiguration(_))));

        let mut too_loud = custom;
        too_loud.power[0] = 40.0;
        assert!(catalog.insert(too_loud).is_err());
    }

    #[test]
    fn profile_deserializes_with_default_mcs_table() {
        let json = r#"{
            "name": "Bench",
            "power": [20, 20, 20, 20, 19, 18, 17, 16],
            "sensitivity": [-90, -88, -86, -84, -80, -76, -74, -72],
            "max_tx_power": 20
        }"#;
        let profile: RadioProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.mcs, BASE_MCS_TABLE);
        assert!(profile.supported_frequencies_mhz.is_empty());
        profile.validate().unwrap();
    }
}
