//! Scenario front-end for the cash-flow simulator
//!
//! Reads and writes YAML scenario documents, sets up logging and runs
//! scenarios through `cashflow_core`.
//!
//! ```ignore
//! cashflow::init_logging("info")?;
//! let summary = cashflow::run_scenario(&std::fs::read_to_string("plan.yaml")?)?;
//! println!("mean present value: {:.2}", summary.present_value_total.mean);
//! ```

pub mod data;
pub mod error;
pub mod logging;
pub mod scenario;

pub use error::ParseError;
pub use logging::init_logging;
pub use scenario::{load, run_scenario, save};
