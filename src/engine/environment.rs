//! Environmental attenuation contributions.
//!
//! Each function is independent of the others; the total is a plain sum.
//! Frequencies are in GHz, distances in km unless stated otherwise.

use serde::Serialize;

use super::types::LinkBudgetParams;

/// Rain attenuation coefficients (k, α) per frequency band, upper bound exclusive (GHz).
const RAIN_COEFFICIENTS: [(f64, f64, f64); 4] = [
    (2.5, 3.87e-5, 0.912),
    (5.0, 6.50e-4, 1.121),
    (7.0, 1.75e-3, 1.308),
    (f64::INFINITY, 3.01e-3, 1.332),
];

const RAIN_RATE_EXPONENT: f64 = 0.8;

fn rain_coefficients(freq_ghz: f64) -> (f64, f64) {
    RAIN_COEFFICIENTS
        .iter()
        .find(|(upper, _, _)| freq_ghz < *upper)
        .map(|(_, k, alpha)| (*k, *alpha))
        .unwrap_or((RAIN_COEFFICIENTS[3].1, RAIN_COEFFICIENTS[3].2))
}

/// Rain attenuation (dB): `k · f^α · R^0.8 · d`, zero without rain.
pub fn rain_attenuation(freq_ghz: f64, rain_rate_mm_hr: f64, distance_km: f64) -> f64 {
    if rain_rate_mm_hr <= 0.0 {
        return 0.0;
    }
    let (k, alpha) = rain_coefficients(freq_ghz);
    k * freq_ghz.powf(alpha) * rain_rate_mm_hr.powf(RAIN_RATE_EXPONENT) * distance_km
}

/// Fog/cloud attenuation (dB) for a liquid water density in g/m³.
pub fn fog_attenuation(freq_ghz: f64, liquid_water_density: f64, distance_km: f64) -> f64 {
    if liquid_water_density <= 0.0 {
        return 0.0;
    }
    0.0001 * freq_ghz.powi(2) * liquid_water_density * distance_km
}

/// Foliage loss (dB) through `depth_m` meters of vegetation.
pub fn vegetation_loss(freq_ghz: f64, depth_m: f64) -> f64 {
    if depth_m <= 0.0 {
        return 0.0;
    }
    0.2 * freq_ghz * depth_m
}

/// Penetration loss (dB) per wall: 4 dB below 2.5 GHz, 6 dB above.
pub fn building_penetration_loss(freq_ghz: f64, wall_count: u32) -> f64 {
    let per_wall = if freq_ghz < 2.5 { 4.0 } else { 6.0 };
    wall_count as f64 * per_wall
}

/// Breakdown of environmental losses for one link.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct EnvironmentalLosses {
    pub rain_db: f64,
    pub fog_db: f64,
    pub vegetation_db: f64,
    pub building_db: f64,
    pub additional_db: f64,
}

impl EnvironmentalLosses {
    pub fn from_params(params: &LinkBudgetParams) -> Self {
        Self {
            rain_db: rain_attenuation(params.frequency_ghz, params.rain_rate_mm_hr, params.distance_km),
            fog_db: fog_attenuation(params.frequency_ghz, params.fog_density_g_m3, params.distance_km),
            vegetation_db: vegetation_loss(params.frequency_ghz, params.vegetation_depth_m),
            building_db: building_penetration_loss(params.frequency_ghz, params.wall_count),
            additional_db: params.additional_losses_db,
        }
    }

    pub fn total(&self) -> f64 {
        self.rain_db + self.fog_db + self.vegetation_db + self.building_db + self.additional_db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAND_SAMPLES_GHZ: [f64; 5] = [0.9, 2.45, 4.9, 5.8, 10.0];

    #[test]
    fn rain_is_zero_without_rain_in_every_band() {
        for f in BAND_SAMPLES_GHZ {
            assert_eq!(rain_attenuation(f, 0.0, 10.0), 0.0);
            assert_eq!(rain_attenuation(f, -5.0, 10.0), 0.0);
        }
    }

    #[test]
    fn rain_is_positive_with_rain_in_every_band() {
        for f in BAND_SAMPLES_GHZ {
            assert!(rain_attenuation(f, 25.0, 10.0) > 0.0);
        }
    }

    #[test]
    fn rain_band_selection() {
        assert_eq!(rain_coefficients(2.4), (3.87e-5, 0.912));
        assert_eq!(rain_coefficients(2.5), (6.50e-4, 1.121));
        assert_eq!(rain_coefficients(6.99), (1.75e-3, 1.308));
        assert_eq!(rain_coefficients(7.0), (3.01e-3, 1.332));
        // Heavier rain over a longer path always costs more
        assert!(rain_attenuation(5.8, 50.0, 10.0) > rain_attenuation(5.8, 10.0, 10.0));
        assert!(rain_attenuation(5.8, 10.0, 20.0) > rain_attenuation(5.8, 10.0, 10.0));
    }

    #[test]
    fn fog_vegetation_and_walls() {
        assert!((fog_attenuation(10.0, 0.5, 2.0) - 0.01).abs() < 1e-12);
        assert_eq!(fog_attenuation(10.0, 0.0, 2.0), 0.0);
        assert!((vegetation_loss(2.45, 10.0) - 4.9).abs() < 1e-12);
        assert_eq!(vegetation_loss(2.45, 0.0), 0.0);
        assert_eq!(building_penetration_loss(2.4, 2), 8.0);
        assert_eq!(building_penetration_loss(5.8, 2), 12.0);
        assert_eq!(building_penetration_loss(5.8, 0), 0.0);
    }

    #[test]
    fn losses_sum_without_interaction() {
        let params = LinkBudgetParams {
            distance_km: 3.0,
            frequency_ghz: 5.8,
            rain_rate_mm_hr: 12.0,
            fog_density_g_m3: 0.3,
            vegetation_depth_m: 5.0,
            wall_count: 1,
            additional_losses_db: 2.0,
            ..LinkBudgetParams::default()
        };
        let losses = EnvironmentalLosses::from_params(&params);
        let expected = rain_attenuation(5.8, 12.0, 3.0) + fog_attenuation(5.8, 0.3, 3.0) + vegetation_loss(5.8, 5.0) + 6.0 + 2.0;
        assert!((losses.total() - expected).abs() < 1e-12);
        assert_eq!(EnvironmentalLosses::from_params(&LinkBudgetParams::default()).total(), 0.0);
    }
}
