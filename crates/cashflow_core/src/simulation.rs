//! Monte Carlo driver
//!
//! Iterations are independent: iteration `k` draws from its own generator
//! seeded by `iteration_seed(run_seed, k)`, so any iteration can be replayed
//! on its own and the result does not depend on thread scheduling.
//!
//! Work is split into fixed batches in index order. Each batch fills a local
//! `StatisticsCollector`; batch collectors are merged in batch order once all
//! batches finish.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rand::SeedableRng;
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::config::SimulationConfig;
use crate::discount::Discounter;
use crate::error::{ModelError, Result, SimulationError};
use crate::investment::{internal_rate_of_return, payback_period};
use crate::model::{CashFlowSheet, IterationOutcome, SimulationSummary, Trajectory};
use crate::statistics::StatisticsCollector;

/// Generator used for every iteration
pub type IterationRng = rand::rngs::SmallRng;

const ITERATIONS_PER_BATCH: usize = 100;

/// Seed for iteration `iteration` of a run seeded with `run_seed` (SplitMix64 mix)
#[must_use]
pub fn iteration_seed(run_seed: u64, iteration: usize) -> u64 {
    let mut z = run_seed
        .wrapping_add((iteration as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Progress counter and cooperative cancellation flag for a run
#[derive(Debug, Clone, Default)]
pub struct RunProgress {
    completed: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl RunProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Share existing atomics with a caller (e.g. a UI thread)
    pub fn from_atomics(completed: Arc<AtomicUsize>, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            completed,
            cancelled,
        }
    }

    /// Iterations finished so far
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.completed.store(0, Ordering::Relaxed);
        self.cancelled.store(false, Ordering::Relaxed);
    }

    /// Request that the run stop at the next iteration boundary
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Lifecycle of a `Simulator`
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatorState {
    /// Configured, no summary yet
    Idle,
    /// Iterations in progress
    Running,
    /// Summary is final
    Done(SimulationSummary),
}

/// Drives the Monte Carlo run over a validated sheet and config
#[derive(Debug)]
pub struct Simulator<'a> {
    sheet: &'a CashFlowSheet,
    config: SimulationConfig,
    discounter: Discounter,
    state: SimulatorState,
}

impl<'a> Simulator<'a> {
    /// Validate everything up front so no simulation time is spent on a bad model.
    pub fn new(sheet: &'a CashFlowSheet, config: SimulationConfig) -> Result<Self> {
        sheet.validate()?;
        config.validate()?;
        let discounter = Discounter::new(config.interest_rate)?;
        Ok(Self {
            sheet,
            config,
            discounter,
            state: SimulatorState::Idle,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> &SimulatorState {
        &self.state
    }

    #[must_use]
    pub fn summary(&self) -> Option<&SimulationSummary> {
        match &self.state {
            SimulatorState::Done(summary) => Some(summary),
            _ => None,
        }
    }

    /// Run every iteration and return the final summary.
    ///
    /// On cancellation or failure the simulator returns to `Idle` and all
    /// partial statistics are dropped. Once `Done`, further calls return the
    /// existing summary.
    pub fn run(&mut self, progress: Option<&RunProgress>) -> Result<&SimulationSummary> {
        if matches!(self.state, SimulatorState::Idle) {
            self.state = SimulatorState::Running;
            tracing::info!(
                iterations = self.config.iterations,
                years = self.config.years,
                interest_rate = self.config.interest_rate,
                seed = self.config.seed,
                "Starting Monte Carlo cash-flow simulation"
            );

            match self.collect(progress) {
                Ok(collector) => {
                    let summary = collector.finalize();
                    tracing::info!(
                        iterations = summary.iterations,
                        mean_present_value = summary.present_value_total.mean,
                        std_dev = summary.present_value_total.std_dev,
                        "Monte Carlo simulation complete"
                    );
                    self.state = SimulatorState::Done(summary);
                }
                Err(err) => {
                    self.state = SimulatorState::Idle;
                    match &err {
                        SimulationError::RunAborted { completed } => {
                            tracing::warn!(
                                completed = completed,
                                "Monte Carlo simulation cancelled"
                            )
                        }
                        other => tracing::error!(error = %other, "Monte Carlo simulation failed"),
                    }
                    return Err(err);
                }
            }
        }

        self.summary().ok_or_else(|| {
            SimulationError::InternalInvariantViolation(
                "simulator left Running without a summary".to_string(),
            )
        })
    }

    /// Re-run iteration `iteration` in isolation.
    ///
    /// Produces exactly the trajectory that iteration contributes to a full run.
    pub fn replay_iteration(&self, iteration: usize) -> Result<IterationOutcome> {
        if iteration >= self.config.iterations {
            return Err(SimulationError::InternalInvariantViolation(format!(
                "iteration {iteration} is outside a run of {} iterations",
                self.config.iterations
            )));
        }
        let seed = iteration_seed(self.config.seed, iteration);
        let trajectory = self.sample_trajectory(iteration, seed)?;
        let present_value = self.discounter.discount(&trajectory.nominal);
        Ok(IterationOutcome {
            seed,
            payback_period: payback_period(&trajectory.nominal),
            internal_rate_of_return: internal_rate_of_return(&trajectory.nominal),
            trajectory,
            present_value,
        })
    }

    fn sample_trajectory(&self, iteration: usize, seed: u64) -> Result<Trajectory> {
        let mut rng = IterationRng::seed_from_u64(seed);
        let years = self.config.years;
        let groups = self.sheet.groups().len();

        let mut nominal = Vec::with_capacity(years as usize);
        let mut by_group = vec![Vec::with_capacity(years as usize); groups];
        let mut year_costs = vec![0.0; groups];

        for year in 1..=years {
            let total = self
                .sheet
                .costs_by_group(year, years, &mut rng, &mut year_costs)
                .map_err(|e| sampling_failure(iteration, year, &e))?;
            nominal.push(total);
            for (series, cost) in by_group.iter_mut().zip(&year_costs) {
                series.push(*cost);
            }
        }

        Ok(Trajectory {
            iteration,
            nominal,
            by_group,
        })
    }

    fn run_batch(
        &self,
        batch: usize,
        progress: Option<&RunProgress>,
    ) -> Result<StatisticsCollector> {
        let mut collector = StatisticsCollector::new(&self.config, self.group_names());
        let start = batch * ITERATIONS_PER_BATCH;
        let end = (start + ITERATIONS_PER_BATCH).min(self.config.iterations);

        for iteration in start..end {
            if let Some(progress) = progress
                && progress.is_cancelled()
            {
                return Err(SimulationError::RunAborted {
                    completed: progress.completed(),
                });
            }

            let trajectory =
                self.sample_trajectory(iteration, iteration_seed(self.config.seed, iteration))?;
            let present_value = self.discounter.discount(&trajectory.nominal);
            collector.ingest(&trajectory, &present_value);

            if let Some(progress) = progress {
                progress.increment();
            }
        }

        tracing::debug!(batch = batch, iterations = end - start, "Batch complete");
        Ok(collector)
    }

    fn collect(&self, progress: Option<&RunProgress>) -> Result<StatisticsCollector> {
        let num_batches = self.config.iterations.div_ceil(ITERATIONS_PER_BATCH);

        #[cfg(feature = "parallel")]
        let batches: Vec<StatisticsCollector> = (0..num_batches)
            .into_par_iter()
            .map(|batch| self.run_batch(batch, progress))
            .collect::<Result<_>>()?;

        #[cfg(not(feature = "parallel"))]
        let batches: Vec<StatisticsCollector> = (0..num_batches)
            .map(|batch| self.run_batch(batch, progress))
            .collect::<Result<_>>()?;

        let mut collector = StatisticsCollector::new(&self.config, self.group_names());
        for batch in batches {
            collector.merge(batch);
        }
        Ok(collector)
    }

    fn group_names(&self) -> Vec<String> {
        self.sheet
            .groups()
            .iter()
            .map(|group| group.name().to_string())
            .collect()
    }
}

fn sampling_failure(iteration: usize, year: u32, err: &ModelError) -> SimulationError {
    SimulationError::InternalInvariantViolation(format!(
        "sampling failed in iteration {iteration}, year {year}: {err}"
    ))
}

/// Run a full simulation and return its summary
pub fn simulate(sheet: &CashFlowSheet, config: &SimulationConfig) -> Result<SimulationSummary> {
    simulate_with_progress(sheet, config, None)
}

/// Run a full simulation, reporting progress and honouring cancellation
pub fn simulate_with_progress(
    sheet: &CashFlowSheet,
    config: &SimulationConfig,
    progress: Option<&RunProgress>,
) -> Result<SimulationSummary> {
    let mut simulator = Simulator::new(sheet, config.clone())?;
    simulator.run(progress)?;
    match simulator.state {
        SimulatorState::Done(summary) => Ok(summary),
        _ => Err(SimulationError::InternalInvariantViolation(
            "run returned without a final summary".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_seeds_are_distinct() {
        let seeds: std::collections::HashSet<u64> =
            (0..10_000).map(|k| iteration_seed(42, k)).collect();
        assert_eq!(seeds.len(), 10_000);
        assert_ne!(iteration_seed(1, 0), iteration_seed(2, 0));
    }

    #[test]
    fn test_progress_flags() {
        let progress = RunProgress::new();
        assert!(!progress.is_cancelled());
        progress.increment();
        progress.cancel();
        assert_eq!(progress.completed(), 1);
        assert!(progress.is_cancelled());
        progress.reset();
        assert_eq!(progress.completed(), 0);
        assert!(!progress.is_cancelled());
    }

    #[test]
    fn test_sampling_failure_is_internal() {
        let err = ModelError::InvalidParameter {
            distribution: "Gaussian",
            parameter: "sigma",
            value: -1.0,
            reason: "must be finite and non-negative",
        };
        let mapped = sampling_failure(7, 3, &err);
        match mapped {
            SimulationError::InternalInvariantViolation(message) => {
                assert!(message.contains("iteration 7, year 3"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
