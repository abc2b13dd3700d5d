//! Top-down link budget at a fixed distance.
//!
//! Unlike the MCS sweep, this model does not use a radio profile: the
//! sensitivity comes from a coarse three-tier table keyed by the recommended
//! MCS.

use log::debug;

use super::environment::EnvironmentalLosses;
use super::propagation::{free_space_path_loss, thermal_noise_floor_dbm, two_ray_ground_path_loss};
use super::types::{BASE_MCS_COUNT, EngineError, LinkBudget, LinkBudgetParams, SignalQuality, ensure_finite};

/// SNR (dB) kept in reserve before picking an MCS.
pub const MCS_SAFETY_MARGIN_DB: f64 = 3.0;

/// Minimum SNR (dB) for MCS 0-7.
pub const MCS_SNR_THRESHOLDS_DB: [f64; BASE_MCS_COUNT] = [5.0, 8.0, 11.0, 14.0, 18.0, 22.0, 26.0, 29.0];

/// Highest MCS whose SNR threshold is met; MCS 0 when none is.
/// Two MIMO streams shift the result into MCS 8-15.
pub fn determine_optimal_mcs(snr_db: f64, mimo_streams: u8) -> u8 {
    let base = MCS_SNR_THRESHOLDS_DB.iter().rposition(|threshold| snr_db >= *threshold).unwrap_or(0) as u8;
    if mimo_streams == 2 { base + BASE_MCS_COUNT as u8 } else { base }
}

/// Simplified receiver sensitivity (dBm) for an MCS index.
pub fn sensitivity_for_mcs(mcs: u8) -> f64 {
    match mcs {
        0..=3 => -90.0,
        4..=7 => -80.0,
        _ => -70.0,
    }
}

/// Empirical fading allowance: `5 + 5 · log10(d_km · f_GHz)`.
pub fn fading_margin_db(distance_km: f64, freq_ghz: f64) -> f64 {
    5.0 + 5.0 * (distance_km * freq_ghz).log10()
}

/// Compute the full budget for one link.
///
/// Uses the two-ray ground model when both antenna heights are positive,
/// free space otherwise.
pub fn compute_link_budget(params: &LinkBudgetParams) -> Result<LinkBudget, EngineError> {
    params.validate()?;

    let path_loss_db = if params.tx_height_m > 0.0 && params.rx_height_m > 0.0 {
        two_ray_ground_path_loss(params.distance_km, params.frequency_ghz, params.tx_height_m, params.rx_height_m)?
    } else {
        free_space_path_loss(params.distance_km, params.frequency_ghz)?
    };
    let losses = EnvironmentalLosses::from_params(params);
    let environment_loss_db = ensure_finite(losses.total(), "environment loss")?;
    debug!(
        "Path loss {:.2} dB, environment {:.2} dB (rain {:.2}, fog {:.2}, vegetation {:.2}, building {:.2}, other {:.2})",
        path_loss_db, environment_loss_db, losses.rain_db, losses.fog_db, losses.vegetation_db, losses.building_db, losses.additional_db
    );

    let fading_margin_db = ensure_finite(fading_margin_db(params.distance_km, params.frequency_ghz), "fading margin")?;
    let eirp_dbm = params.tx_power_dbm + params.tx_antenna_gain_dbi - params.tx_cable_loss_db;
    let received_signal_power_dbm = eirp_dbm - path_loss_db - environment_loss_db + params.rx_antenna_gain_dbi - params.rx_cable_loss_db;
    let noise_floor_dbm = ensure_finite(
        thermal_noise_floor_dbm(params.bandwidth_mhz * 1e6, params.temperature_c, params.noise_figure_db),
        "noise floor",
    )?;
    let snr_db = received_signal_power_dbm - noise_floor_dbm;

    let recommended_mcs = determine_optimal_mcs(snr_db - MCS_SAFETY_MARGIN_DB, params.mimo_streams);
    let sensitivity_dbm = sensitivity_for_mcs(recommended_mcs);
    let link_margin_db = received_signal_power_dbm - sensitivity_dbm;
    let link_status = SignalQuality::from_margin(link_margin_db);
    debug!(
        "Received {:.2} dBm, noise {:.2} dBm, SNR {:.2} dB -> MCS {}, margin {:.2} dB ({})",
        received_signal_power_dbm, noise_floor_dbm, snr_db, recommended_mcs, link_margin_db, link_status
    );

    Ok(LinkBudget {
        path_loss_db,
        environment_loss_db,
        fading_margin_db,
        eirp_dbm,
        received_signal_power_dbm,
        noise_floor_dbm,
        snr_db,
        recommended_mcs,
        mimo_streams: params.mimo_streams,
        sensitivity_dbm,
        link_margin_db,
        link_status,
    })
}
