//! Tests for the simulator lifecycle
//!
//! These tests verify that:
//! - A simulator starts Idle and ends Done with a summary
//! - Invalid configs are rejected before any iteration runs
//! - Cancellation, before or during a run, discards partial results and returns to Idle
//! - Progress counts every completed iteration

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize};

use crate::config::{GroupBuilder, ItemBuilder, SheetBuilder, SimulationConfig};
use crate::error::{ConfigError, SimulationError};
use crate::model::{CashFlowSheet, Distribution};
use crate::simulation::{RunProgress, Simulator, SimulatorState, simulate_with_progress};

fn sheet() -> CashFlowSheet {
    SheetBuilder::new()
        .group(
            GroupBuilder::new("Operations").item(
                ItemBuilder::new("Power")
                    .recurring(Distribution::Gaussian {
                        mu: 50.0,
                        sigma: 5.0,
                    })
                    .recurring_from(1),
            ),
        )
        .build()
        .unwrap()
}

#[test]
fn test_idle_to_done() {
    let sheet = sheet();
    let mut simulator = Simulator::new(&sheet, SimulationConfig::new(0.05, 5, 120)).unwrap();
    assert_eq!(simulator.state(), &SimulatorState::Idle);
    assert!(simulator.summary().is_none());

    let iterations = simulator.run(None).unwrap().iterations;
    assert_eq!(iterations, 120);
    assert!(matches!(simulator.state(), SimulatorState::Done(_)));
    assert_eq!(simulator.summary().unwrap().yearly.len(), 5);
}

#[test]
fn test_run_when_done_returns_same_summary() {
    let sheet = sheet();
    let mut simulator = Simulator::new(&sheet, SimulationConfig::new(0.05, 5, 50)).unwrap();
    let first = simulator.run(None).unwrap().clone();

    // A second run must not resample
    let progress = RunProgress::new();
    let second = simulator.run(Some(&progress)).unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(progress.completed(), 0);
}

#[test]
fn test_invalid_config_rejected_up_front() {
    let sheet = sheet();

    let err = Simulator::new(&sheet, SimulationConfig::new(0.05, 0, 10)).unwrap_err();
    assert_eq!(
        err,
        SimulationError::InvalidConfig(ConfigError::NonPositiveYears(0))
    );

    let err = Simulator::new(&sheet, SimulationConfig::new(0.05, 10, 0)).unwrap_err();
    assert_eq!(
        err,
        SimulationError::InvalidConfig(ConfigError::NonPositiveIterations(0))
    );

    let err = Simulator::new(&sheet, SimulationConfig::new(-1.0, 10, 10)).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::InvalidConfig(ConfigError::InvalidInterestRate(_))
    ));

    let err = Simulator::new(&sheet, SimulationConfig::new(f64::NAN, 10, 10)).unwrap_err();
    assert!(matches!(err, SimulationError::InvalidConfig(_)));

    let config = SimulationConfig::new(0.05, 10, 10).with_percentiles([0.5, 1.5]);
    let err = Simulator::new(&sheet, config).unwrap_err();
    assert_eq!(
        err,
        SimulationError::InvalidConfig(ConfigError::InvalidPercentile(1.5))
    );
}

#[test]
fn test_cancel_before_run_aborts() {
    let sheet = sheet();
    let mut simulator = Simulator::new(&sheet, SimulationConfig::new(0.05, 5, 1_000)).unwrap();

    let progress = RunProgress::new();
    progress.cancel();

    let err = simulator.run(Some(&progress)).unwrap_err();
    assert_eq!(err, SimulationError::RunAborted { completed: 0 });
    assert_eq!(simulator.state(), &SimulatorState::Idle);
    assert!(simulator.summary().is_none());

    // The same simulator can run again once the flag is cleared
    progress.reset();
    assert_eq!(simulator.run(Some(&progress)).unwrap().iterations, 1_000);
    assert_eq!(progress.completed(), 1_000);
}

#[test]
fn test_cancel_from_another_thread_mid_run() {
    let sheet = sheet();
    let mut simulator = Simulator::new(&sheet, SimulationConfig::new(0.05, 50, 1_000_000)).unwrap();
    let progress = RunProgress::new();

    let result = std::thread::scope(|scope| {
        let watcher = progress.clone();
        scope.spawn(move || {
            while watcher.completed() == 0 {
                std::thread::yield_now();
            }
            watcher.cancel();
        });
        simulator.run(Some(&progress)).map(|summary| summary.iterations)
    });

    match result {
        Err(SimulationError::RunAborted { completed }) => {
            assert!(completed > 0);
            assert!(completed < 1_000_000);
        }
        other => panic!("expected an aborted run, got {other:?}"),
    }
    assert_eq!(simulator.state(), &SimulatorState::Idle);
    assert!(simulator.summary().is_none());
}

#[test]
fn test_cancel_through_shared_atomics() {
    let sheet = sheet();
    let completed = Arc::new(AtomicUsize::new(0));
    let cancelled = Arc::new(AtomicBool::new(true));
    let progress = RunProgress::from_atomics(completed.clone(), cancelled.clone());

    let config = SimulationConfig::new(0.0, 3, 300);
    let result = simulate_with_progress(&sheet, &config, Some(&progress));
    assert!(matches!(result, Err(SimulationError::RunAborted { .. })));
}

#[test]
fn test_progress_counts_every_iteration() {
    let sheet = sheet();
    let progress = RunProgress::new();
    let config = SimulationConfig::new(0.0, 4, 777);
    let summary = simulate_with_progress(&sheet, &config, Some(&progress)).unwrap();

    assert_eq!(summary.iterations, 777);
    assert_eq!(progress.completed(), 777);
    assert!(!progress.is_cancelled());
}

#[test]
fn test_replay_out_of_range() {
    let sheet = sheet();
    let simulator = Simulator::new(&sheet, SimulationConfig::new(0.0, 4, 10)).unwrap();
    assert!(simulator.replay_iteration(9).is_ok());
    assert!(matches!(
        simulator.replay_iteration(10),
        Err(SimulationError::InternalInvariantViolation(_))
    ));
}
