//! Scenario input shared by the library and the command-line driver.

pub mod scenario;

pub use scenario::{Scenario, ScenarioLoadError, load_scenario, validate_scenario};
