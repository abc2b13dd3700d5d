//! Point-to-point radio link planner.
//!
//! The `engine` module holds the numeric models; `common` and `config` load
//! the scenario and settings files consumed by the command-line driver.

pub mod common;
pub mod config;
pub mod engine;

pub use engine::{
    EngineError, LinkBudget, LinkBudgetParams, LinkConfiguration, RadioProfileCatalog, SweepPair, compute_link_budget, generate_report, sweep_mcs,
    sweep_mcs_by_name,
};
