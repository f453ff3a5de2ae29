//! Scenario documents
//!
//! `scenario_data` mirrors the YAML layout; `convert` maps it to and from
//! the engine's `CashFlowSheet` and `SimulationConfig`.

pub mod convert;
pub mod scenario_data;

pub use convert::{from_model, to_model};
pub use scenario_data::ScenarioData;
