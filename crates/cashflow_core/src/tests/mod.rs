//! Integration tests for the cash-flow simulation engine
//!
//! Tests are organized by topic:
//! - `scenarios` - Worked examples with known trajectories
//! - `windows` - Upfront and recurring year windows over full runs
//! - `reproducibility` - Seeding, replay and determinism
//! - `lifecycle` - Simulator states, validation and cancellation
//! - `stochastic` - Statistical behaviour of sampled sheets

mod lifecycle;
