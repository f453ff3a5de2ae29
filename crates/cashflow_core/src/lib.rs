//! Monte Carlo cash-flow simulation library
//!
//! This crate evaluates a multi-year cost plan under uncertainty:
//! - Cash-flow items with upfront and recurring costs drawn from
//!   Gaussian, Constant or Pareto distributions
//! - Per-cost active year windows
//! - Aggregation through groups into a sheet
//! - Present-value discounting at a fixed interest rate
//! - Payback period and internal rate of return per iteration
//! - Parallel, reproducible iterations with exact percentiles
//!
//! # Builder DSL
//!
//! ```ignore
//! use cashflow_core::config::{GroupBuilder, ItemBuilder, SheetBuilder, SimulationConfig};
//! use cashflow_core::simulation::simulate;
//!
//! let sheet = SheetBuilder::new()
//!     .group(GroupBuilder::new("Hardware")
//!         .item(ItemBuilder::new("Server")
//!             .upfront_amount(100.0)
//!             .upfront_in_year(1)
//!             .recurring_amount(10.0)
//!             .recurring_years(1, 3)))
//!     .build()?;
//!
//! let summary = simulate(&sheet, &SimulationConfig::new(0.05, 3, 1_000))?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod discount;
pub mod error;
pub mod investment;
pub mod simulation;
pub mod statistics;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{GroupBuilder, ItemBuilder, SheetBuilder, SimulationConfig};
pub use error::{ConfigError, ModelError, SimulationError};
pub use simulation::{RunProgress, Simulator, SimulatorState, simulate, simulate_with_progress};
