//! MCS sweep: range, throughput and Fresnel clearance per MCS index, and
//! selection of the operating point.
//!
//! The airtime model is 802.11n style: an aggregated MPDU burst followed by
//! a block ack at the basic rate, plus AIFS and average contention backoff.
//! Times are in microseconds and rates in bits/µs, so throughput comes out in
//! Mbps.
//!
//! Intermediate values are rounded at the same points as the reference range
//! calculator (range and Fresnel clearance to 0.1 m, total airtime to 0.1 µs,
//! throughput to 0.01 Mbps). The selection rule compares the rounded values.

use log::{debug, info, warn};

use super::propagation::{
    SPEED_OF_LIGHT_M_PER_US, frequency_correction_factor, fresnel_zone_radius, range_from_link_budget, round_to, thermal_noise_floor_dbm,
};
use super::radio_profile::{RadioProfile, RadioProfileCatalog};
use super::types::{BASE_MCS_COUNT, EngineError, LinkConfiguration, McsFamily, McsPoint, SweepPair, SweepResult, ensure_finite};

/// Fixed margin (dB) kept below the configured power limit.
pub const POWER_LIMIT_MARGIN_DB: f64 = 3.0;
/// Share of aggregated frames assumed delivered.
pub const PACKET_SUCCESS_RATIO: f64 = 0.9;
/// Temperature used for the per-point SNR figure.
pub const REFERENCE_TEMPERATURE_C: f64 = 20.0;

const AIFS_US: f64 = 8.0;
const CONTENTION_WINDOW_SLOTS: f64 = 15.0;
const PHY_HEADER_US: f64 = 40.0;
const LONG_TRAINING_FIELD_US: f64 = 4.0;
const SIFS_US: f64 = 10.0;
const BASIC_RATE_MBPS: f64 = 12.0;
const MPDU_DELIMITER_BYTES: f64 = 0.0;
const TXOP_LIMIT_US: f64 = 100_000.0;
const PAYLOAD_BYTES: f64 = 1500.0;
const MAC_HEADER_BYTES: f64 = 34.0;
const BLOCK_ACK_BYTES: f64 = 32.0;

/// Data symbol rate factor: 14.4 for 40 MHz channels, 13 otherwise.
pub fn guard_interval_rate(bandwidth_mhz: f64) -> f64 {
    if bandwidth_mhz == 40.0 { 14.4 } else { 13.0 }
}

/// Airtime components of one aggregated transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FrameTiming {
    max_frames: f64,
    phy_time: f64,
    ba_response_time: f64,
    phy_overhead: f64,
}

impl FrameTiming {
    fn new(link_speed: f64, basic_rate_speed: f64, streams: u8, aggregation: u32) -> Self {
        let frame_bits = (PAYLOAD_BYTES + MAC_HEADER_BYTES + MPDU_DELIMITER_BYTES) * 8.0;
        // Fractional frame counts are kept
        let frames_in_txop = TXOP_LIMIT_US / (frame_bits / link_speed);
        let max_frames = frames_in_txop.min(aggregation as f64).max(1.0);
        Self {
            max_frames,
            phy_time: PHY_HEADER_US + LONG_TRAINING_FIELD_US * streams as f64 + max_frames * frame_bits / link_speed,
            ba_response_time: SIFS_US + PHY_HEADER_US + BLOCK_ACK_BYTES * 8.0 / basic_rate_speed,
            phy_overhead: AIFS_US + CONTENTION_WINDOW_SLOTS / 2.0,
        }
    }

    fn without_transit(&self) -> f64 {
        self.phy_time + self.phy_overhead + self.ba_response_time
    }
}

/// Inputs shared by every point of one sweep.
struct SweepContext<'a> {
    profile: &'a RadioProfile,
    config: &'a LinkConfiguration,
    streams: u8,
    correction: f64,
    aggregation: u32,
    demand_mbps: f64,
    height_agl_m: f64,
    noise_floor_dbm: f64,
}

fn evaluate_point(ctx: &SweepContext, index: usize) -> Result<McsPoint, EngineError> {
    let profile = ctx.profile;
    let config = ctx.config;
    let streams = ctx.streams as f64;
    let bandwidth = config.bandwidth_mhz;
    let coding_rate = profile.coding_rate(index);
    let bits = profile.bits_per_symbol(index) as f64;

    let adjusted_power = profile.power[index].min(config.power_limit_dbm - POWER_LIMIT_MARGIN_DB);
    let adjusted_sensitivity =
        profile.sensitivity[index] - 10.0 * (config.antenna_count as f64 / streams).log10() - 10.0 * (20.0 / bandwidth).log10();
    let mcs_index = (index + (ctx.streams as usize - 1) * BASE_MCS_COUNT) as u8;

    let link_speed = bits * coding_rate * streams * guard_interval_rate(bandwidth) * bandwidth / 20.0;
    let basic_rate_speed = BASIC_RATE_MBPS * (bandwidth / 20.0) * bits * coding_rate.min(0.75);
    let timing = FrameTiming::new(link_speed, basic_rate_speed, ctx.streams, ctx.aggregation);

    let range_m = range_from_link_budget(
        adjusted_power,
        adjusted_sensitivity,
        config.fade_margin_db,
        config.antenna_gain_dbi,
        config.frequency_mhz,
        ctx.correction,
    )?;

    // Round trip for data and block ack, in µs
    let transit_delay = (1000.0 * 4.0 * range_m / SPEED_OF_LIGHT_M_PER_US).round() / 1000.0;
    let time_without_transit = timing.without_transit();
    let time_total = round_to(time_without_transit + transit_delay, 1);

    let payload_bits = timing.max_frames * PAYLOAD_BYTES * 8.0;
    let ideal_throughput = ensure_finite(payload_bits / time_without_transit, "ideal throughput")?;
    let max_throughput = ensure_finite(payload_bits / time_total, "throughput")?;
    let throughput_mbps = round_to(max_throughput * PACKET_SUCCESS_RATIO, 2);

    let fresnel_clearance_m = round_to(
        fresnel_zone_radius(range_m / 1000.0, config.frequency_mhz / 1000.0, config.fresnel_clearance_percent),
        1,
    );
    let fresnel_clearance_m = ensure_finite(fresnel_clearance_m, "Fresnel clearance")?;

    let point = McsPoint {
        mcs_index,
        range_m,
        throughput_mbps,
        fresnel_clearance_m,
        modulation: profile.modulation(index),
        coding_rate,
        meets_throughput: ctx.demand_mbps <= throughput_mbps,
        meets_clearance: ctx.height_agl_m >= fresnel_clearance_m,
        link_speed_mbps: link_speed,
        ideal_throughput_mbps: round_to(ideal_throughput, 2),
        snr_db: round_to(adjusted_sensitivity - ctx.noise_floor_dbm, 1),
    };
    debug!(
        "MCS {}: power {:.1} dBm, sensitivity {:.2} dBm, range {} m, throughput {} Mbps, clearance {} m",
        point.mcs_index, adjusted_power, adjusted_sensitivity, point.range_m, point.throughput_mbps, point.fresnel_clearance_m
    );
    Ok(point)
}

/// Pick the operating point index.
///
/// Walks from the most robust MCS upward and moves the selection to point
/// `i` whenever point `i - 1` misses the throughput demand or the clearance.
/// Point `i` itself is not checked before it is adopted.
pub fn select_operating_point(points: &[McsPoint]) -> usize {
    let mut selected = 0;
    for i in 1..points.len() {
        if !points[i - 1].meets_constraints() {
            selected = i;
        }
    }
    selected
}

/// Evaluate all eight base MCS indices for one family and select the operating point.
pub fn sweep_family(profile: &RadioProfile, config: &LinkConfiguration, family: McsFamily) -> Result<SweepResult, EngineError> {
    config.validate()?;
    if !profile.supported_frequencies_mhz.is_empty() && !profile.supports_frequency(config.frequency_mhz) {
        debug!("{} MHz is not a listed frequency of profile {}", config.frequency_mhz, profile.name);
    }

    let streams = config.streams_for(family);
    let ctx = SweepContext {
        profile,
        config,
        streams,
        correction: frequency_correction_factor(config.frequency_mhz, config.near_ground),
        aggregation: config.frame_aggregation(),
        demand_mbps: config.application_throughput_mbps(),
        height_agl_m: config.height_agl.to_meters(),
        noise_floor_dbm: thermal_noise_floor_dbm(config.bandwidth_mhz * 1e6, REFERENCE_TEMPERATURE_C, config.noise_figure_db),
    };

    let points = (0..BASE_MCS_COUNT).map(|i| evaluate_point(&ctx, i)).collect::<Result<Vec<_>, _>>()?;
    let selected = &points[select_operating_point(&points)];
    let (final_range_m, final_mcs_index, final_fresnel_clearance_m) = (selected.range_m, selected.mcs_index, selected.fresnel_clearance_m);

    let result = SweepResult {
        family,
        final_range_m,
        final_mcs_index,
        final_fresnel_clearance_m,
        total_throughput_demand_mbps: ctx.demand_mbps,
        frequency_correction: ctx.correction,
        frame_aggregation_count: ctx.aggregation,
        points,
    };

    if result.has_viable_link() {
        info!(
            "{} sweep for {}: MCS {} at {} m (clearance {} m, demand {} Mbps)",
            family, profile.name, result.final_mcs_index, result.final_range_m, result.final_fresnel_clearance_m, ctx.demand_mbps
        );
    } else {
        warn!("{} sweep for {}: no viable link (final range {} m)", family, profile.name, result.final_range_m);
    }
    Ok(result)
}

/// Run the diversity and multiplexing sweeps for one configuration.
pub fn sweep_mcs(profile: &RadioProfile, config: &LinkConfiguration) -> Result<SweepPair, EngineError> {
    Ok(SweepPair {
        diversity: sweep_family(profile, config, McsFamily::Diversity)?,
        multiplexing: sweep_family(profile, config, McsFamily::Multiplexing)?,
    })
}

/// Look up `profile_name` and run both sweeps. Fails before any computation
/// when the profile is unknown.
pub fn sweep_mcs_by_name(catalog: &RadioProfileCatalog, profile_name: &str, config: &LinkConfiguration) -> Result<SweepPair, EngineError> {
    let profile = catalog.get(profile_name)?;
    sweep_mcs(profile, config)
}
