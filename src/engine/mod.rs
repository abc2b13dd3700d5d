//! Link planning engine.
//!
//! Pure numeric models for point-to-point radio links:
//! - Per-MCS range, throughput and Fresnel clearance sweeps over a radio profile
//! - Operating point selection against a throughput demand and antenna height
//! - Top-down link budget with environmental losses
//! - Text report for a link budget
//!
//! ## Module Organization
//!
//! - `types`: Value types, configuration validation and `EngineError`
//! - `radio_profile`: Radio hardware profiles and the catalog
//! - `propagation`: Path loss, Fresnel radius, range and noise formulas
//! - `environment`: Rain, fog, vegetation and building losses
//! - `mcs_sweep`: MCS sweep and operating point selection
//! - `link_budget`: Fixed-distance link budget
//! - `report`: Report formatting
//!
//! Nothing here keeps state between calls; the catalog is the only long-lived
//! object and it is read-only once built.

pub mod environment;
pub mod link_budget;
pub mod mcs_sweep;
pub mod propagation;
pub mod radio_profile;
pub mod report;
pub mod types;

pub use link_budget::compute_link_budget;
pub use mcs_sweep::{sweep_family, sweep_mcs, sweep_mcs_by_name};
pub use radio_profile::{RadioProfile, RadioProfileCatalog};
pub use report::generate_report;
pub use types::{
    EngineError, HeightAboveGround, HeightUnit, LinkBudget, LinkBudgetParams, LinkConfiguration, McsFamily, McsPoint, SignalQuality, SweepPair,
    SweepResult,
};
