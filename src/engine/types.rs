//! Type definitions for the planning engine.
//!
//! Contains all value types flowing through the engine:
//! - Error taxonomy (`EngineError`)
//! - Per-MCS modulation/coding characteristics
//! - Link configuration for MCS sweeps and its validation
//! - Sweep results (`McsPoint`, `SweepResult`, `SweepPair`)
//! - Link budget parameters, results and signal quality classification
//!
//! Every type here is an immutable value once constructed; nothing is shared
//! or mutated between calls.

use serde::{Deserialize, Serialize};

/// Number of base MCS indices described by a radio profile (single stream).
pub const BASE_MCS_COUNT: usize = 8;

/// Channel bandwidths (MHz) accepted by the sweep engine.
pub const SUPPORTED_BANDWIDTHS_MHZ: [f64; 7] = [3.0, 5.0, 10.0, 15.0, 20.0, 26.0, 40.0];

/// Meters per foot, used for height conversion.
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Error type for engine computations.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The requested radio profile is not present in the catalog.
    UnknownProfile(String),
    /// A numeric input is non-positive or outside its domain.
    InvalidConfiguration(String),
    /// A formula produced NaN or infinity.
    NonFiniteResult(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::UnknownProfile(name) => write!(f, "Unknown radio profile: {}", name),
            EngineError::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            EngineError::NonFiniteResult(msg) => write!(f, "Non-finite result: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

/// Return `value` unchanged if finite, otherwise a `NonFiniteResult` naming the quantity.
pub(crate) fn ensure_finite(value: f64, what: &str) -> Result<f64, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::NonFiniteResult(format!("{} evaluated to {}", what, value)))
    }
}

/// Reject non-finite or non-positive inputs.
pub(crate) fn ensure_positive(value: f64, what: &str) -> Result<f64, EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EngineError::InvalidConfiguration(format!("{} must be a positive number, got {}", what, value)))
    }
}

/// Modulation used by an MCS index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modulation {
    #[serde(rename = "BPSK")]
    Bpsk,
    #[serde(rename = "QPSK")]
    Qpsk,
    #[serde(rename = "16-QAM")]
    Qam16,
    #[serde(rename = "64-QAM")]
    Qam64,
}

impl std::fmt::Display for Modulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modulation::Bpsk => write!(f, "BPSK"),
            Modulation::Qpsk => write!(f, "QPSK"),
            Modulation::Qam16 => write!(f, "16-QAM"),
            Modulation::Qam64 => write!(f, "64-QAM"),
        }
    }
}

/// Modulation and coding metadata for one base MCS index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McsCharacteristics {
    pub modulation: Modulation,
    pub coding_rate: f64,
    pub bits_per_symbol: u32,
}

const fn mcs(modulation: Modulation, coding_rate: f64, bits_per_symbol: u32) -> McsCharacteristics {
    McsCharacteristics {
        modulation,
        coding_rate,
        bits_per_symbol,
    }
}

/// 802.11n single-stream MCS 0-7 table shared by every built-in profile.
pub const BASE_MCS_TABLE: [McsCharacteristics; BASE_MCS_COUNT] = [
    mcs(Modulation::Bpsk, 1.0 / 2.0, 1),
    mcs(Modulation::Qpsk, 1.0 / 2.0, 2),
    mcs(Modulation::Qpsk, 3.0 / 4.0, 2),
    mcs(Modulation::Qam16, 1.0 / 2.0, 4),
    mcs(Modulation::Qam16, 3.0 / 4.0, 4),
    mcs(Modulation::Qam64, 2.0 / 3.0, 6),
    mcs(Modulation::Qam64, 3.0 / 4.0, 6),
    mcs(Modulation::Qam64, 5.0 / 6.0, 6),
];

/// Unit of a height value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Meters,
    Feet,
}

/// Antenna height above ground level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightAboveGround {
    pub value: f64,
    #[serde(default)]
    pub unit: HeightUnit,
}

impl HeightAboveGround {
    pub fn meters(value: f64) -> Self {
        Self { value, unit: HeightUnit::Meters }
    }

    pub fn feet(value: f64) -> Self {
        Self { value, unit: HeightUnit::Feet }
    }

    pub fn to_meters(&self) -> f64 {
        match self.unit {
            HeightUnit::Meters => self.value,
            HeightUnit::Feet => self.value * METERS_PER_FOOT,
        }
    }
}

/// MCS family evaluated by a sweep.
///
/// - `Diversity`: MCS 0-7, a single effective stream regardless of antenna count
/// - `Multiplexing`: the configured effective stream count; MCS 8-15 with two streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum McsFamily {
    #[default]
    Diversity,
    Multiplexing,
}

impl std::fmt::Display for McsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            McsFamily::Diversity => write!(f, "Diversity"),
            McsFamily::Multiplexing => write!(f, "Multiplexing"),
        }
    }
}

fn default_antenna_count() -> u8 {
    2
}

fn default_data_streams() -> u8 {
    2
}

fn default_frame_aggregation_count() -> u32 {
    10
}

fn default_fresnel_clearance_percent() -> f64 {
    60.0
}

fn default_noise_figure_db() -> f64 {
    5.0
}

/// Maximum aggregated frames when operating near ground.
pub const NEAR_GROUND_MAX_AGGREGATION: u32 = 2;

/// RF and application parameters for one MCS sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfiguration {
    /// Carrier frequency in MHz.
    pub frequency_mhz: f64,
    /// Channel bandwidth in MHz, one of `SUPPORTED_BANDWIDTHS_MHZ`.
    pub bandwidth_mhz: f64,
    #[serde(default = "default_antenna_count")]
    pub antenna_count: u8,
    #[serde(default = "default_data_streams")]
    pub data_streams: u8,
    pub antenna_gain_dbi: f64,
    pub fade_margin_db: f64,
    /// Regulatory/operator transmit power ceiling in dBm.
    pub power_limit_dbm: f64,
    /// Requested A-MPDU size. See `frame_aggregation()` for the value actually used.
    #[serde(default = "default_frame_aggregation_count")]
    pub frame_aggregation_count: u32,
    #[serde(default)]
    pub near_ground: bool,
    #[serde(default = "default_fresnel_clearance_percent")]
    pub fresnel_clearance_percent: f64,
    #[serde(default)]
    pub telemetry_kbps: f64,
    #[serde(default)]
    pub video_mbps: f64,
    pub height_agl: HeightAboveGround,
    /// Family the caller wants to look at first. Both families are always computed.
    #[serde(default)]
    pub mcs_family: McsFamily,
    /// Receiver noise figure used for the per-point SNR figure.
    #[serde(default = "default_noise_figure_db")]
    pub noise_figure_db: f64,
}

impl LinkConfiguration {
    /// Streams the radio can actually carry: `min(data_streams, antenna_count)`.
    pub fn effective_streams(&self) -> u8 {
        self.data_streams.min(self.antenna_count)
    }

    /// Streams used for a given family.
    pub fn streams_for(&self, family: McsFamily) -> u8 {
        match family {
            McsFamily::Diversity => 1,
            McsFamily::Multiplexing => self.effective_streams(),
        }
    }

    /// Aggregation count used by the airtime model (capped near ground).
    pub fn frame_aggregation(&self) -> u32 {
        if self.near_ground {
            self.frame_aggregation_count.min(NEAR_GROUND_MAX_AGGREGATION)
        } else {
            self.frame_aggregation_count
        }
    }

    /// Total application demand in Mbps (telemetry + video).
    pub fn application_throughput_mbps(&self) -> f64 {
        self.telemetry_kbps / 1000.0 + self.video_mbps
    }

    /// Check every field against its domain.
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_positive(self.frequency_mhz, "frequency_mhz")?;
        if !SUPPORTED_BANDWIDTHS_MHZ.contains(&self.bandwidth_mhz) {
            return Err(EngineError::InvalidConfiguration(format!(
                "bandwidth_mhz {} is not one of {:?}",
                self.bandwidth_mhz, SUPPORTED_BANDWIDTHS_MHZ
            )));
        }
        if !(1..=2).contains(&self.antenna_count) {
            return Err(EngineError::InvalidConfiguration(format!("antenna_count {} must be 1 or 2", self.antenna_count)));
        }
        if !(1..=2).contains(&self.data_streams) {
            return Err(EngineError::InvalidConfiguration(format!("data_streams {} must be 1 or 2", self.data_streams)));
        }
        if self.frame_aggregation_count == 0 {
            return Err(EngineError::InvalidConfiguration("frame_aggregation_count must be at least 1".to_string()));
        }
        ensure_positive(self.fresnel_clearance_percent, "fresnel_clearance_percent")?;
        for (value, what) in [
            (self.antenna_gain_dbi, "antenna_gain_dbi"),
            (self.fade_margin_db, "fade_margin_db"),
            (self.power_limit_dbm, "power_limit_dbm"),
            (self.noise_figure_db, "noise_figure_db"),
        ] {
            if !value.is_finite() {
                return Err(EngineError::InvalidConfiguration(format!("{} must be finite, got {}", what, value)));
            }
        }
        for (value, what) in [
            (self.telemetry_kbps, "telemetry_kbps"),
            (self.video_mbps, "video_mbps"),
            (self.height_agl.value, "height_agl"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfiguration(format!("{} must be non-negative, got {}", what, value)));
            }
        }
        Ok(())
    }
}

/// Evaluation of one MCS index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct McsPoint {
    pub mcs_index: u8,
    /// Range at which the link budget closes, meters (0.1 m resolution).
    pub range_m: f64,
    /// Application throughput after transit delay and packet success ratio, Mbps.
    pub throughput_mbps: f64,
    /// Required Fresnel clearance at mid-path, meters.
    pub fresnel_clearance_m: f64,
    pub modulation: Modulation,
    pub coding_rate: f64,
    pub meets_throughput: bool,
    pub meets_clearance: bool,
    /// Raw PHY data rate.
    pub link_speed_mbps: f64,
    /// Throughput without transit delay and packet loss.
    pub ideal_throughput_mbps: f64,
    /// SNR at the receiver sensitivity limit.
    pub snr_db: f64,
}

impl McsPoint {
    pub fn meets_constraints(&self) -> bool {
        self.meets_throughput && self.meets_clearance
    }
}

/// Outcome of one sweep over the eight base MCS indices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepResult {
    pub family: McsFamily,
    /// Exactly `BASE_MCS_COUNT` points in ascending MCS order.
    pub points: Vec<McsPoint>,
    pub final_range_m: f64,
    pub final_mcs_index: u8,
    pub final_fresnel_clearance_m: f64,
    pub total_throughput_demand_mbps: f64,
    pub frequency_correction: f64,
    pub frame_aggregation_count: u32,
}

impl SweepResult {
    /// A non-positive final range means the budget never closes.
    pub fn has_viable_link(&self) -> bool {
        self.final_range_m > 0.0
    }

    pub fn final_point(&self) -> Option<&McsPoint> {
        self.points.iter().find(|p| p.mcs_index == self.final_mcs_index)
    }
}

/// Both families computed for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPair {
    pub diversity: SweepResult,
    pub multiplexing: SweepResult,
}

impl SweepPair {
    pub fn selected(&self, family: McsFamily) -> &SweepResult {
        match family {
            McsFamily::Diversity => &self.diversity,
            McsFamily::Multiplexing => &self.multiplexing,
        }
    }
}

/// Qualitative link classification derived from link margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl SignalQuality {
    /// Classify a link margin (dB). Thresholds are exclusive: exactly 20 dB is `Good`.
    pub fn from_margin(link_margin_db: f64) -> Self {
        if link_margin_db > 20.0 {
            SignalQuality::Excellent
        } else if link_margin_db > 15.0 {
            SignalQuality::Good
        } else if link_margin_db > 10.0 {
            SignalQuality::Fair
        } else if link_margin_db > 5.0 {
            SignalQuality::Poor
        } else {
            SignalQuality::Critical
        }
    }
}

impl std::fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalQuality::Excellent => write!(f, "Excellent"),
            SignalQuality::Good => write!(f, "Good"),
            SignalQuality::Fair => write!(f, "Fair"),
            SignalQuality::Poor => write!(f, "Poor"),
            SignalQuality::Critical => write!(f, "Critical"),
        }
    }
}

/// Inputs for a top-down link budget at a fixed distance.
///
/// Environmental inputs left at zero contribute no loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkBudgetParams {
    pub tx_power_dbm: f64,
    pub tx_antenna_gain_dbi: f64,
    pub rx_antenna_gain_dbi: f64,
    pub tx_cable_loss_db: f64,
    pub rx_cable_loss_db: f64,
    pub distance_km: f64,
    pub frequency_ghz: f64,
    pub bandwidth_mhz: f64,
    pub noise_figure_db: f64,
    pub temperature_c: f64,
    /// Transmit antenna height (m). Two-ray ground model needs both heights > 0.
    pub tx_height_m: f64,
    pub rx_height_m: f64,
    pub rain_rate_mm_hr: f64,
    /// Fog/cloud liquid water density (g/m³).
    pub fog_density_g_m3: f64,
    pub vegetation_depth_m: f64,
    pub wall_count: u32,
    pub additional_losses_db: f64,
    pub mimo_streams: u8,
}

impl Default for LinkBudgetParams {
    fn default() -> Self {
        Self {
            tx_power_dbm: 20.0,
            tx_antenna_gain_dbi: 6.0,
            rx_antenna_gain_dbi: 6.0,
            tx_cable_loss_db: 0.0,
            rx_cable_loss_db: 0.0,
            distance_km: 1.0,
            frequency_ghz: 2.45,
            bandwidth_mhz: 20.0,
            noise_figure_db: 4.0,
            temperature_c: 20.0,
            tx_height_m: 0.0,
            rx_height_m: 0.0,
            rain_rate_mm_hr: 0.0,
            fog_density_g_m3: 0.0,
            vegetation_depth_m: 0.0,
            wall_count: 0,
            additional_losses_db: 0.0,
            mimo_streams: 1,
        }
    }
}

impl LinkBudgetParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        ensure_positive(self.distance_km, "distance_km")?;
        ensure_positive(self.frequency_ghz, "frequency_ghz")?;
        ensure_positive(self.bandwidth_mhz, "bandwidth_mhz")?;
        if !(1..=2).contains(&self.mimo_streams) {
            return Err(EngineError::InvalidConfiguration(format!("mimo_streams {} must be 1 or 2", self.mimo_streams)));
        }
        // Absolute zero is the only hard floor on temperature.
        if !self.temperature_c.is_finite() || self.temperature_c <= -273.15 {
            return Err(EngineError::InvalidConfiguration(format!("temperature_c {} is below absolute zero", self.temperature_c)));
        }
        for (value, what) in [
            (self.tx_power_dbm, "tx_power_dbm"),
            (self.tx_antenna_gain_dbi, "tx_antenna_gain_dbi"),
            (self.rx_antenna_gain_dbi, "rx_antenna_gain_dbi"),
            (self.tx_cable_loss_db, "tx_cable_loss_db"),
            (self.rx_cable_loss_db, "rx_cable_loss_db"),
            (self.noise_figure_db, "noise_figure_db"),
            (self.tx_height_m, "tx_height_m"),
            (self.rx_height_m, "rx_height_m"),
            (self.rain_rate_mm_hr, "rain_rate_mm_hr"),
            (self.fog_density_g_m3, "fog_density_g_m3"),
            (self.vegetation_depth_m, "vegetation_depth_m"),
            (self.additional_losses_db, "additional_losses_db"),
        ] {
            if !value.is_finite() {
                return Err(EngineError::InvalidConfiguration(format!("{} must be finite, got {}", what, value)));
            }
        }
        Ok(())
    }
}

/// Result of a link budget calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkBudget {
    pub path_loss_db: f64,
    /// Sum of rain, fog, vegetation, building and additional losses.
    pub environment_loss_db: f64,
    pub fading_margin_db: f64,
    pub eirp_dbm: f64,
    pub received_signal_power_dbm: f64,
    pub noise_floor_dbm: f64,
    pub snr_db: f64,
    pub recommended_mcs: u8,
    pub mimo_streams: u8,
    pub sensitivity_dbm: f64,
    pub link_margin_db: f64,
    pub link_status: SignalQuality,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> LinkConfiguration {
        LinkConfiguration {
            frequency_mhz: 2450.0,
            bandwidth_mhz: 20.0,
            antenna_count: 2,
            data_streams: 2,
            antenna_gain_dbi: 6.0,
            fade_margin_db: 10.0,
            power_limit_dbm: 33.0,
            frame_aggregation_count: 10,
            near_ground: false,
            fresnel_clearance_percent: 60.0,
            telemetry_kbps: 50.0,
            video_mbps: 3.0,
            height_agl: HeightAboveGround::feet(400.0),
            mcs_family: McsFamily::Diversity,
            noise_figure_db: 5.0,
        }
    }

    #[test]
    fn height_converts_feet_to_meters() {
        assert!((HeightAboveGround::feet(400.0).to_meters() - 121.92).abs() < 1e-9);
        assert_eq!(HeightAboveGround::meters(12.5).to_meters(), 12.5);
    }

    #[test]
    fn demand_combines_telemetry_and_video() {
        assert!((base_config().application_throughput_mbps() - 3.05).abs() < 1e-12);
    }

    #[test]
    fn effective_streams_limited_by_antennas() {
        let mut cfg = base_config();
        assert_eq!(cfg.effective_streams(), 2);
        cfg.antenna_count = 1;
        assert_eq!(cfg.effective_streams(), 1);
        assert_eq!(cfg.streams_for(McsFamily::Diversity), 1);
        assert_eq!(cfg.streams_for(McsFamily::Multiplexing), 1);
    }

    #[test]
    fn near_ground_caps_aggregation() {
        let mut cfg = base_config();
        assert_eq!(cfg.frame_aggregation(), 10);
        cfg.near_ground = true;
        assert_eq!(cfg.frame_aggregation(), 2);
        cfg.frame_aggregation_count = 1;
        assert_eq!(cfg.frame_aggregation(), 1);
    }

    #[test]
    fn validate_rejects_out_of_domain_values() {
        assert!(base_config().validate().is_ok());

        let mut cfg = base_config();
        cfg.bandwidth_mhz = 80.0;
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfiguration(_))));

        let mut cfg = base_config();
        cfg.frequency_mhz = 0.0;
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfiguration(_))));

        let mut cfg = base_config();
        cfg.data_streams = 0;
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfiguration(_))));

        let mut cfg = base_config();
        cfg.antenna_count = 3;
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfiguration(_))));

        let mut cfg = base_config();
        cfg.fade_margin_db = f64::NAN;
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfiguration(_))));
    }

    #[test]
    fn signal_quality_thresholds_are_exclusive() {
        assert_eq!(SignalQuality::from_margin(25.0), SignalQuality::Excellent);
        assert_eq!(SignalQuality::from_margin(20.0), SignalQuality::Good);
        assert_eq!(SignalQuality::from_margin(15.0), SignalQuality::Fair);
        assert_eq!(SignalQuality::from_margin(10.0), SignalQuality::Poor);
        assert_eq!(SignalQuality::from_margin(5.0), SignalQuality::Critical);
        assert_eq!(SignalQuality::from_margin(-12.0), SignalQuality::Critical);
    }

    #[test]
    fn link_configuration_deserializes_with_defaults() {
        let json = r#"{
            "frequency_mhz": 2450,
            "bandwidth_mhz": 20,
            "antenna_gain_dbi": 6,
            "fade_margin_db": 10,
            "power_limit_dbm": 33,
            "height_agl": { "value": 400, "unit": "feet" }
        }"#;
        let cfg: LinkConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.frame_aggregation_count, 10);
        assert_eq!(cfg.fresnel_clearance_percent, 60.0);
        assert_eq!(cfg.antenna_count, 2);
        assert_eq!(cfg.mcs_family, McsFamily::Diversity);
        assert!(!cfg.near_ground);
        assert_eq!(cfg.height_agl.unit, HeightUnit::Feet);
    }

    #[test]
    fn budget_params_validation() {
        assert!(LinkBudgetParams::default().validate().is_ok());
        let params = LinkBudgetParams {
            distance_km: -1.0,
            ..LinkBudgetParams::default()
        };
        assert!(matches!(params.validate(), Err(EngineError::InvalidConfiguration(_))));
        let params = LinkBudgetParams {
            mimo_streams: 4,
            ..LinkBudgetParams::default()
        };
        assert!(params.validate().is_err());
    }
}
