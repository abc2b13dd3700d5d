//! Human-readable link budget report.

use super::types::{BASE_MCS_COUNT, LinkBudget, SignalQuality};

/// 802.11n PHY rates (Mbps) for MCS 0-15 at 20 MHz, long guard interval.
pub const MCS_THROUGHPUT_TABLE_MBPS: [f64; 2 * BASE_MCS_COUNT] =
    [6.5, 13.0, 19.5, 26.0, 39.0, 52.0, 58.5, 65.0, 13.0, 26.0, 39.0, 52.0, 78.0, 104.0, 117.0, 130.0];

/// Streams assumed by the report's throughput estimate.
const REPORT_STREAMS: u8 = 2;

/// Expected throughput (Mbps) for an MCS, scaled by bandwidth and packet loss.
///
/// With a single stream, MCS 8-15 fold onto their single-stream equivalents.
pub fn estimate_throughput(mcs: u8, bandwidth_mhz: f64, streams: u8, packet_loss_percent: f64) -> f64 {
    let mut index = (mcs as usize).min(MCS_THROUGHPUT_TABLE_MBPS.len() - 1);
    if streams < 2 {
        index %= BASE_MCS_COUNT;
    }
    MCS_THROUGHPUT_TABLE_MBPS[index] * (bandwidth_mhz / 20.0) * (1.0 - packet_loss_percent / 100.0)
}

fn recommendation(budget: &LinkBudget) -> Vec<&'static str> {
    match budget.link_status {
        SignalQuality::Critical => vec![
            "Link is not expected to close reliably.",
            "Reduce the distance or raise antenna heights to restore line of sight.",
            "Use higher gain antennas or increase transmit power within regulatory limits.",
            "Consider a lower frequency band for better propagation.",
        ],
        SignalQuality::Poor => vec![
            "Link will be unstable under fading.",
            "Increase antenna gain or reduce cable losses.",
            "Verify Fresnel zone clearance along the path.",
        ],
        SignalQuality::Fair => vec![
            "Link should work with occasional degradation.",
            "Monitor link quality and keep a lower MCS available as fallback.",
        ],
        SignalQuality::Good | SignalQuality::Excellent => vec![
            "Link budget is healthy for the planned distance.",
            "Higher MCS rates or longer distances are feasible.",
        ],
    }
}

/// Format a budget as a text report. Pure and deterministic.
pub fn generate_report(budget: &LinkBudget, distance_km: f64, freq_ghz: f64, bandwidth_mhz: f64) -> String {
    let throughput = estimate_throughput(budget.recommended_mcs, bandwidth_mhz, REPORT_STREAMS, 0.0);
    let mut out = format!(
        "=== Link Budget Report ===\n\
         \n\
         Link parameters\n\
         \x20 Distance:            {:.2} km\n\
         \x20 Frequency:           {:.3} GHz\n\
         \x20 Channel bandwidth:   {:.0} MHz\n\
         \n\
         Budget\n\
         \x20 EIRP:                {:.2} dBm\n\
         \x20 Path loss:           {:.2} dB\n\
         \x20 Environmental loss:  {:.2} dB\n\
         \x20 Fading margin:       {:.2} dB\n\
         \x20 Received power:      {:.2} dBm\n\
         \x20 Noise floor:         {:.2} dBm\n\
         \x20 SNR:                 {:.2} dB\n\
         \x20 Sensitivity:         {:.2} dBm\n\
         \x20 Link margin:         {:.2} dB\n\
         \n\
         Performance\n\
         \x20 Link status:         {}\n\
         \x20 Recommended MCS:     {}\n\
         \x20 Expected throughput: {:.1} Mbps\n",
        distance_km,
        freq_ghz,
        bandwidth_mhz,
        budget.eirp_dbm,
        budget.path_loss_db,
        budget.environment_loss_db,
        budget.fading_margin_db,
        budget.received_signal_power_dbm,
        budget.noise_floor_dbm,
        budget.snr_db,
        budget.sensitivity_dbm,
        budget.link_margin_db,
        budget.link_status,
        budget.recommended_mcs,
        throughput,
    );
    if budget.link_margin_db < budget.fading_margin_db {
        out.push_str("  Warning: link margin is below the estimated fading margin\n");
    }
    out.push_str("\nRecommendation\n");
    for line in recommendation(budget) {
        out.push_str(&format!("  - {}\n", line));
    }
    out
}
