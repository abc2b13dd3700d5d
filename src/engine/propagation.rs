//! Radio propagation and link budget formulas.
//!
//! Contains helpers for:
//! - Free-space and two-ray ground path loss
//! - Fresnel zone clearance radius
//! - Empirical near-ground frequency correction
//! - Range estimation by inverting the free-space link budget
//! - dBm/mW conversion and thermal noise floor
//!
//! Units:
//! - Power: dBm, mW (conversion provided)
//! - Distance: km for path loss and Fresnel formulas, meters for ranges
//! - Frequency: GHz for path loss and Fresnel formulas, MHz for range and correction

use std::f64::consts::PI;

use super::types::{EngineError, ensure_finite, ensure_positive};

/// Free-space path loss constant for distance in km and frequency in GHz.
pub const FSPL_CONSTANT_DB: f64 = 92.45;

/// Propagation speed used by range and transit delay calculations (m/µs).
pub const SPEED_OF_LIGHT_M_PER_US: f64 = 300.0;

/// Boltzmann's constant (J/K).
pub const BOLTZMANN_CONSTANT: f64 = 1.38064852e-23;

/// Offset between degrees Celsius and Kelvin.
pub const CELSIUS_TO_KELVIN: f64 = 273.15;

/// First Fresnel zone mid-path radius coefficient for km/GHz inputs, meters.
const FRESNEL_COEFFICIENT: f64 = 8.66;

/// Near-ground correction polynomial coefficients in ascending powers of MHz.
const NEAR_GROUND_CORRECTION_COEFFICIENTS: [f64; 4] = [0.84, 2.24e-3, -4.8e-7, 4.0e-11];

/// Round to a fixed number of decimal places, half away from zero.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Calculate the free-space path loss (in dB).
///
/// # Formula
///
/// ```text
/// FSPL(dB) = 20 × log₁₀(d) + 20 × log₁₀(f) + 92.45
/// ```
///
/// Where:
/// - `d`: Distance in kilometers
/// - `f`: Frequency in GHz
///
/// # Returns
///
/// Path loss in dB, or `InvalidConfiguration` when either input is non-positive.
pub fn free_space_path_loss(distance_km: f64, freq_ghz: f64) -> Result<f64, EngineError> {
    ensure_positive(distance_km, "distance_km")?;
    ensure_positive(freq_ghz, "freq_ghz")?;
    Ok(20.0 * distance_km.log10() + 20.0 * freq_ghz.log10() + FSPL_CONSTANT_DB)
}

/// Distance (km) at which free-space loss equals `loss_db`. Exact inverse of
/// `free_space_path_loss`.
pub fn free_space_distance_km(loss_db: f64, freq_ghz: f64) -> Result<f64, EngineError> {
    ensure_positive(freq_ghz, "freq_ghz")?;
    ensure_finite(loss_db, "loss_db")?;
    let exponent = (loss_db - FSPL_CONSTANT_DB - 20.0 * freq_ghz.log10()) / 20.0;
    ensure_finite(10f64.powf(exponent), "free-space distance")
}

/// Calculate path loss (in dB) with the two-ray ground reflection model.
///
/// # Formula
///
/// ```text
/// PL(dB) = FSPL(d, f) − 20 × log₁₀(h_t × h_r) + 10
/// ```
///
/// Both antenna heights (meters) must be positive; callers fall back to
/// `free_space_path_loss` otherwise.
pub fn two_ray_ground_path_loss(distance_km: f64, freq_ghz: f64, tx_height_m: f64, rx_height_m: f64) -> Result<f64, EngineError> {
    ensure_positive(tx_height_m, "tx_height_m")?;
    ensure_positive(rx_height_m, "rx_height_m")?;
    let fspl = free_space_path_loss(distance_km, freq_ghz)?;
    Ok(fspl - 20.0 * (tx_height_m * rx_height_m).log10() + 10.0)
}

/// Radius (meters) of the requested fraction of the first Fresnel zone at mid-path.
///
/// ```text
/// r = 8.66 × sqrt(d_km / f_GHz) × clearance% / 100
/// ```
pub fn fresnel_zone_radius(distance_km: f64, freq_ghz: f64, clearance_percent: f64) -> f64 {
    FRESNEL_COEFFICIENT * (distance_km / freq_ghz).sqrt() * clearance_percent / 100.0
}

/// Empirical path loss exponent correction applied when antennas sit close to the ground.
///
/// A cubic in frequency (MHz), rounded to four decimals. Returns 0 when
/// `near_ground` is false.
pub fn frequency_correction_factor(freq_mhz: f64, near_ground: bool) -> f64 {
    if !near_ground {
        return 0.0;
    }
    // Horner form of c0 + c1·f + c2·f² + c3·f³
    let correction = NEAR_GROUND_CORRECTION_COEFFICIENTS
        .iter()
        .rev()
        .fold(0.0, |acc, coefficient| acc * freq_mhz + coefficient);
    round_to(correction, 4)
}

// Solve the free-space budget for distance.
// With λ = 300 / f(MHz) meters and a loss slope of (20 + correction) dB/decade:
//   budget = P_tx − S_rx − fade + G
//   d = 10^(budget / (20 + correction)) × λ / (4π)
// The correction steepens the slope for near-ground links.
/// Unrounded distance (meters) at which the link budget closes.
pub fn link_budget_distance_m(
    tx_power_dbm: f64,
    rx_sensitivity_dbm: f64,
    fade_margin_db: f64,
    antenna_gain_dbi: f64,
    freq_mhz: f64,
    correction: f64,
) -> Result<f64, EngineError> {
    for (value, what) in [
        (tx_power_dbm, "tx_power_dbm"),
        (rx_sensitivity_dbm, "rx_sensitivity_dbm"),
        (fade_margin_db, "fade_margin_db"),
        (antenna_gain_dbi, "antenna_gain_dbi"),
        (correction, "correction"),
    ] {
        ensure_finite(value, what)?;
    }
    ensure_positive(freq_mhz, "freq_mhz")?;
    let slope = 20.0 + correction;
    if slope <= 0.0 {
        return Err(EngineError::InvalidConfiguration(format!("path loss slope {} must be positive", slope)));
    }
    let budget = tx_power_dbm - rx_sensitivity_dbm - fade_margin_db + antenna_gain_dbi;
    let distance = 10f64.powf(budget / slope) * SPEED_OF_LIGHT_M_PER_US / freq_mhz / (4.0 * PI);
    ensure_finite(distance, "link budget distance")
}

/// Range (meters, 0.1 m resolution) at which the link budget closes.
///
/// Every MCS point's range comes from here.
pub fn range_from_link_budget(
    tx_power_dbm: f64,
    rx_sensitivity_dbm: f64,
    fade_margin_db: f64,
    antenna_gain_dbi: f64,
    freq_mhz: f64,
    correction: f64,
) -> Result<f64, EngineError> {
    let distance = link_budget_distance_m(tx_power_dbm, rx_sensitivity_dbm, fade_margin_db, antenna_gain_dbi, freq_mhz, correction)?;
    Ok(round_to(distance, 1))
}

/// Convert power from dBm (decibels relative to 1 milliwatt) to milliwatts.
///
/// # Formula
///
/// ```text
/// P(mW) = 10^(P(dBm) / 10)
/// ```
pub fn dbm_to_mw(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0)
}

/// Convert power from milliwatts to dBm.
///
/// # Formula
///
/// ```text
/// P(dBm) = 10 × log₁₀(P(mW))
/// ```
///
/// For `mw <= 0` the result is NaN or -∞; callers check with `ensure_finite`.
pub fn mw_to_dbm(mw: f64) -> f64 {
    10.0 * mw.log10()
}

/// Receiver noise floor (dBm): thermal noise kTB plus the noise figure.
///
/// ```text
/// N(dBm) = 10 × log₁₀(k × T × B × 1000) + NF
/// ```
pub fn thermal_noise_floor_dbm(bandwidth_hz: f64, temperature_c: f64, noise_figure_db: f64) -> f64 {
    let temperature_k = temperature_c + CELSIUS_TO_KELVIN;
    // k·T·B is in watts; ×1000 gives mW
    mw_to_dbm(BOLTZMANN_CONSTANT * temperature_k * bandwidth_hz * 1000.0) + noise_figure_db
}
