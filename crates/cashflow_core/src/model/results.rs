//! Simulation results
//!
//! Contains the transient per-iteration types (`Trajectory`, `PresentValue`)
//! and the final, read-only `SimulationSummary`.

use serde::{Deserialize, Serialize};

/// Nominal per-year costs produced by one iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// 0-based iteration index within the run
    pub iteration: usize,
    /// `nominal[y - 1]` is the sheet cost of year `y`
    pub nominal: Vec<f64>,
    /// `by_group[g][y - 1]` is group `g`'s cost of year `y`
    pub by_group: Vec<Vec<f64>>,
}

impl Trajectory {
    #[must_use]
    pub fn years(&self) -> usize {
        self.nominal.len()
    }

    #[must_use]
    pub fn nominal_total(&self) -> f64 {
        self.nominal.iter().sum()
    }
}

/// Discounted per-year costs and their sum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentValue {
    pub values: Vec<f64>,
    pub total: f64,
}

/// Everything one iteration produces, as returned by a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationOutcome {
    pub seed: u64,
    pub trajectory: Trajectory,
    pub present_value: PresentValue,
    /// Years after the start year until cumulative cost is recovered
    pub payback_period: Option<f64>,
    pub internal_rate_of_return: Option<f64>,
}

/// Summary statistics of one scalar quantity across iterations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// (percentile as 0-1, value)
    pub percentiles: Vec<(f64, f64)>,
}

impl DistributionSummary {
    /// Look up a percentile previously requested in the config
    #[must_use]
    pub fn percentile(&self, p: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|(q, _)| (*q - p).abs() < 1e-9)
            .map(|(_, v)| *v)
    }
}

/// A per-iteration metric that only some iterations define
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Number of iterations where the metric is defined
    pub defined: usize,
    /// `None` when no iteration defines it
    pub distribution: Option<DistributionSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    /// 1-based simulation year
    pub year: u32,
    /// Percentiles are empty unless yearly percentiles were enabled
    pub nominal: DistributionSummary,
    pub present_value_mean: f64,
    pub present_value_std_dev: f64,
}

/// Per-group breakdown of mean costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub name: String,
    pub mean_nominal_by_year: Vec<f64>,
    pub mean_nominal_total: f64,
}

/// Iteration whose present-value total sits closest to a percentile.
/// Replay it with `Simulator::replay_iteration` to inspect the full trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeIteration {
    pub percentile: f64,
    pub iteration: usize,
    pub present_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IterationTotal {
    pub iteration: usize,
    pub present_value: f64,
}

/// Final result of a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub iterations: usize,
    pub years: u32,
    pub interest_rate: f64,
    pub seed: u64,
    pub yearly: Vec<YearSummary>,
    /// Whole-horizon nominal cost
    pub nominal_total: DistributionSummary,
    /// Whole-horizon present value (net present cost)
    pub present_value_total: DistributionSummary,
    /// Over iterations whose cumulative cost turns positive and is later recovered
    pub payback_period: MetricSummary,
    /// Over iterations whose nominal flows change sign
    pub internal_rate_of_return: MetricSummary,
    pub groups: Vec<GroupSummary>,
    pub representative_iterations: Vec<RepresentativeIteration>,
    /// Every iteration's present-value total, ordered by iteration index
    pub iteration_totals: Vec<IterationTotal>,
}

impl SimulationSummary {
    #[must_use]
    pub fn year(&self, year: u32) -> Option<&YearSummary> {
        self.yearly.iter().find(|y| y.year == year)
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupSummary> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Per-year nominal means, year 1 first
    #[must_use]
    pub fn mean_trajectory(&self) -> Vec<f64> {
        self.yearly.iter().map(|y| y.nominal.mean).collect()
    }
}
