//! Streaming statistics over Monte Carlo iterations
//!
//! Means and variances use Welford's online update and Chan's pairwise merge,
//! so per-worker collectors can be combined without revisiting samples.
//! Present-value totals are kept in full: percentiles are exact, at the cost
//! of one `(usize, f64)` per iteration.

use crate::config::SimulationConfig;
use crate::investment::{internal_rate_of_return, payback_period};
use crate::model::{
    DistributionSummary, GroupSummary, IterationTotal, MetricSummary, PresentValue,
    RepresentativeIteration, SimulationSummary, Trajectory, YearSummary,
};

/// Running count, mean, sum of squared deviations, min and max
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn merge(&mut self, other: &RunningStats) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let (n_a, n_b, n) = (self.count as f64, other.count as f64, count as f64);
        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.count = count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance
    ///
    /// NaN once a non-finite sample has been pushed (e.g. an overflowing
    /// heavy-tailed draw).
    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let variance = self.m2 / self.count as f64;
        if variance.is_nan() {
            variance
        } else {
            // Rounding can leave a tiny negative m2 for constant samples
            variance.max(0.0)
        }
    }

    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    fn summary(&self, percentiles: Vec<(f64, f64)>) -> DistributionSummary {
        DistributionSummary {
            mean: self.mean,
            std_dev: self.std_dev(),
            min: if self.count == 0 { 0.0 } else { self.min },
            max: if self.count == 0 { 0.0 } else { self.max },
            percentiles,
        }
    }
}

/// Percentile of an ascending slice, linear between closest ranks.
///
/// `p` is a fraction in [0, 1]. Returns `None` for an empty slice.
#[must_use]
pub fn percentile_of_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    if lower == upper {
        Some(sorted[lower])
    } else {
        Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
    }
}

fn percentiles_of(values: &mut [f64], requested: &[f64]) -> Vec<(f64, f64)> {
    values.sort_by(f64::total_cmp);
    requested
        .iter()
        .filter_map(|&p| percentile_of_sorted(values, p).map(|v| (p, v)))
        .collect()
}

/// Sorting first makes the summary independent of ingestion and merge order.
fn metric_summary(mut values: Vec<f64>, requested: &[f64]) -> MetricSummary {
    if values.is_empty() {
        return MetricSummary {
            defined: 0,
            distribution: None,
        };
    }
    let percentiles = percentiles_of(&mut values, requested);
    let mut stats = RunningStats::new();
    for value in &values {
        stats.push(*value);
    }
    MetricSummary {
        defined: values.len(),
        distribution: Some(stats.summary(percentiles)),
    }
}

/// Accumulates iteration results into a `SimulationSummary`.
///
/// Collectors for disjoint iteration subsets can be merged in any order; the
/// summary only depends on the union of ingested iterations (means and
/// deviations up to floating-point rounding).
#[derive(Debug, Clone)]
pub struct StatisticsCollector {
    years: u32,
    interest_rate: f64,
    seed: u64,
    percentiles: Vec<f64>,
    group_names: Vec<String>,
    nominal_by_year: Vec<RunningStats>,
    present_value_by_year: Vec<RunningStats>,
    /// `[group][year]`
    group_by_year: Vec<Vec<RunningStats>>,
    group_totals: Vec<RunningStats>,
    nominal_total: RunningStats,
    present_value_total: RunningStats,
    iteration_totals: Vec<IterationTotal>,
    /// Defined values only
    payback_periods: Vec<f64>,
    rates_of_return: Vec<f64>,
    /// `[year]` of retained nominal samples, empty when disabled
    yearly_samples: Option<Vec<Vec<f64>>>,
}

impl StatisticsCollector {
    #[must_use]
    pub fn new(config: &SimulationConfig, group_names: Vec<String>) -> Self {
        let years = config.years as usize;
        let groups = group_names.len();
        Self {
            years: config.years,
            interest_rate: config.interest_rate,
            seed: config.seed,
            percentiles: config.percentiles.clone(),
            group_names,
            nominal_by_year: vec![RunningStats::new(); years],
            present_value_by_year: vec![RunningStats::new(); years],
            group_by_year: vec![vec![RunningStats::new(); years]; groups],
            group_totals: vec![RunningStats::new(); groups],
            nominal_total: RunningStats::new(),
            present_value_total: RunningStats::new(),
            iteration_totals: Vec::new(),
            payback_periods: Vec::new(),
            rates_of_return: Vec::new(),
            yearly_samples: config.yearly_percentiles.then(|| vec![Vec::new(); years]),
        }
    }

    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iteration_totals.len()
    }

    /// Record one iteration.
    ///
    /// Values beyond the configured horizon or group count are ignored.
    pub fn ingest(&mut self, trajectory: &Trajectory, present_value: &PresentValue) {
        for (stats, value) in self.nominal_by_year.iter_mut().zip(&trajectory.nominal) {
            stats.push(*value);
        }
        for (stats, value) in self
            .present_value_by_year
            .iter_mut()
            .zip(&present_value.values)
        {
            stats.push(*value);
        }
        for ((per_year, total), costs) in self
            .group_by_year
            .iter_mut()
            .zip(self.group_totals.iter_mut())
            .zip(&trajectory.by_group)
        {
            for (stats, value) in per_year.iter_mut().zip(costs) {
                stats.push(*value);
            }
            total.push(costs.iter().sum());
        }
        if let Some(samples) = self.yearly_samples.as_mut() {
            for (year, value) in samples.iter_mut().zip(&trajectory.nominal) {
                year.push(*value);
            }
        }

        self.payback_periods
            .extend(payback_period(&trajectory.nominal));
        self.rates_of_return
            .extend(internal_rate_of_return(&trajectory.nominal));

        self.nominal_total.push(trajectory.nominal_total());
        self.present_value_total.push(present_value.total);
        self.iteration_totals.push(IterationTotal {
            iteration: trajectory.iteration,
            present_value: present_value.total,
        });
    }

    /// Fold another collector for a disjoint set of iterations into this one.
    pub fn merge(&mut self, other: StatisticsCollector) {
        let merge_all = |into: &mut [RunningStats], from: &[RunningStats]| {
            for (a, b) in into.iter_mut().zip(from) {
                a.merge(b);
            }
        };

        merge_all(&mut self.nominal_by_year, &other.nominal_by_year);
        merge_all(&mut self.present_value_by_year, &other.present_value_by_year);
        for (into, from) in self.group_by_year.iter_mut().zip(&other.group_by_year) {
            merge_all(into, from);
        }
        merge_all(&mut self.group_totals, &other.group_totals);
        self.nominal_total.merge(&other.nominal_total);
        self.present_value_total.merge(&other.present_value_total);
        self.iteration_totals.extend(other.iteration_totals);
        self.payback_periods.extend(other.payback_periods);
        self.rates_of_return.extend(other.rates_of_return);

        if let (Some(into), Some(from)) = (self.yearly_samples.as_mut(), other.yearly_samples) {
            for (a, b) in into.iter_mut().zip(from) {
                a.extend(b);
            }
        }
    }

    /// Produce the final summary. Consumes the collector, so nothing can be
    /// ingested afterwards.
    #[must_use]
    pub fn finalize(mut self) -> SimulationSummary {
        self.iteration_totals.sort_by_key(|t| t.iteration);

        let mut sorted_totals: Vec<f64> = self
            .iteration_totals
            .iter()
            .map(|t| t.present_value)
            .collect();
        let present_value_percentiles = percentiles_of(&mut sorted_totals, &self.percentiles);
        let representative_iterations = present_value_percentiles
            .iter()
            .filter_map(|&(percentile, target)| {
                self.iteration_totals
                    .iter()
                    .min_by(|a, b| {
                        (a.present_value - target)
                            .abs()
                            .total_cmp(&(b.present_value - target).abs())
                    })
                    .map(|t| RepresentativeIteration {
                        percentile,
                        iteration: t.iteration,
                        present_value: t.present_value,
                    })
            })
            .collect();

        let mut yearly_samples = self.yearly_samples.take();
        let yearly = (0..self.years as usize)
            .map(|i| {
                let percentiles = yearly_samples
                    .as_mut()
                    .map(|samples| percentiles_of(&mut samples[i], &self.percentiles))
                    .unwrap_or_default();
                YearSummary {
                    year: i as u32 + 1,
                    nominal: self.nominal_by_year[i].summary(percentiles),
                    present_value_mean: self.present_value_by_year[i].mean(),
                    present_value_std_dev: self.present_value_by_year[i].std_dev(),
                }
            })
            .collect();

        // Nominal-total percentiles would need a second retained vector;
        // the present-value total is the reported headline figure.
        let nominal_total = self.nominal_total.summary(Vec::new());
        let present_value_total = self.present_value_total.summary(present_value_percentiles);
        let payback_period = metric_summary(self.payback_periods, &self.percentiles);
        let internal_rate_of_return = metric_summary(self.rates_of_return, &self.percentiles);

        let groups = self
            .group_names
            .into_iter()
            .zip(self.group_by_year)
            .zip(self.group_totals)
            .map(|((name, per_year), total)| GroupSummary {
                name,
                mean_nominal_by_year: per_year.iter().map(RunningStats::mean).collect(),
                mean_nominal_total: total.mean(),
            })
            .collect();

        SimulationSummary {
            iterations: self.iteration_totals.len(),
            years: self.years,
            interest_rate: self.interest_rate,
            seed: self.seed,
            yearly,
            nominal_total,
            present_value_total,
            payback_period,
            internal_rate_of_return,
            groups,
            representative_iterations,
            iteration_totals: self.iteration_totals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::Discounter;

    fn config(years: u32) -> SimulationConfig {
        SimulationConfig::new(0.0, years, 1).with_percentiles([0.05, 0.25, 0.5, 0.75, 0.95])
    }

    fn trajectory(iteration: usize, nominal: Vec<f64>) -> Trajectory {
        Trajectory {
            iteration,
            by_group: vec![nominal.clone()],
            nominal,
        }
    }

    fn ingest_all(collector: &mut StatisticsCollector, rate: f64, rows: &[(usize, Vec<f64>)]) {
        let discounter = Discounter::new(rate).unwrap();
        for (iteration, nominal) in rows {
            let pv = discounter.discount(nominal);
            collector.ingest(&trajectory(*iteration, nominal.clone()), &pv);
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_running_stats_matches_two_pass() {
        let values = [3.0, 7.5, -2.0, 11.25, 0.5, 4.0];
        let mut stats = RunningStats::new();
        for v in values {
            stats.push(v);
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
        assert!(close(stats.mean(), mean));
        assert!(close(stats.variance(), variance));
        assert_eq!(stats.count(), 6);
    }

    #[test]
    fn test_welford_stable_with_large_offset() {
        // Naive sum-of-squares loses everything at this magnitude
        let mut stats = RunningStats::new();
        for v in [1e9 + 4.0, 1e9 + 7.0, 1e9 + 13.0, 1e9 + 16.0] {
            stats.push(v);
        }
        assert!(close(stats.variance(), 22.5), "got {}", stats.variance());
    }

    #[test]
    fn test_infinite_sample_is_not_reported_as_no_spread() {
        let mut stats = RunningStats::new();
        for v in [1.0, f64::INFINITY, 2.0] {
            stats.push(v);
        }
        assert!(stats.variance().is_nan());
        assert!(stats.std_dev().is_nan());
        assert_eq!(stats.max, f64::INFINITY);

        let mut merged = RunningStats::new();
        merged.push(3.0);
        merged.merge(&stats);
        assert!(merged.std_dev().is_nan());
    }

    #[test]
    fn test_constant_present_value_has_no_spread() {
        let mut collector = StatisticsCollector::new(&config(2), vec!["All".into()]);
        let rows: Vec<_> = (0..50).map(|i| (i, vec![60.0, 40.0])).collect();
        ingest_all(&mut collector, 0.0, &rows);

        let summary = collector.finalize();
        assert_eq!(summary.iterations, 50);
        assert_eq!(summary.present_value_total.mean, 100.0);
        assert_eq!(summary.present_value_total.std_dev, 0.0);
        for (_, value) in &summary.present_value_total.percentiles {
            assert_eq!(*value, 100.0);
        }
        assert_eq!(summary.yearly[0].nominal.std_dev, 0.0);
        assert_eq!(summary.yearly[1].nominal.percentile(0.5), Some(40.0));
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile_of_sorted(&sorted, 0.0), Some(1.0));
        assert_eq!(percentile_of_sorted(&sorted, 0.5), Some(3.0));
        assert_eq!(percentile_of_sorted(&sorted, 1.0), Some(5.0));
        assert_eq!(percentile_of_sorted(&sorted, 0.125), Some(1.5));
        assert_eq!(percentile_of_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_merge_equals_single_collector() {
        let rows: Vec<(usize, Vec<f64>)> = (0..40)
            .map(|i| {
                let x = i as f64;
                (i, vec![x * 1.5 - 7.0, (x * 0.37).sin() * 20.0, x * x / 10.0])
            })
            .collect();

        let mut single = StatisticsCollector::new(&config(3), vec!["All".into()]);
        ingest_all(&mut single, 0.05, &rows);
        let expected = single.finalize();

        // Disjoint, interleaved subsets merged in reverse order
        let (evens, odds): (Vec<_>, Vec<_>) = rows.iter().cloned().partition(|(i, _)| i % 2 == 0);
        let mut a = StatisticsCollector::new(&config(3), vec!["All".into()]);
        let mut b = StatisticsCollector::new(&config(3), vec!["All".into()]);
        ingest_all(&mut a, 0.05, &evens);
        ingest_all(&mut b, 0.05, &odds);
        b.merge(a);
        let merged = b.finalize();

        assert_eq!(merged.iterations, expected.iterations);
        assert_eq!(merged.iteration_totals, expected.iteration_totals);
        assert_eq!(
            merged.present_value_total.percentiles,
            expected.present_value_total.percentiles
        );
        assert!(close(merged.present_value_total.mean, expected.present_value_total.mean));
        assert!(close(
            merged.present_value_total.std_dev,
            expected.present_value_total.std_dev
        ));
        for (m, e) in merged.yearly.iter().zip(&expected.yearly) {
            assert!(close(m.nominal.mean, e.nominal.mean));
            assert!(close(m.nominal.std_dev, e.nominal.std_dev));
            assert!(close(m.present_value_mean, e.present_value_mean));
            assert_eq!(m.nominal.percentiles, e.nominal.percentiles);
            assert_eq!(m.nominal.min, e.nominal.min);
            assert_eq!(m.nominal.max, e.nominal.max);
        }
        assert_eq!(
            merged.representative_iterations,
            expected.representative_iterations
        );
        assert_eq!(merged.payback_period, expected.payback_period);
        assert_eq!(merged.internal_rate_of_return, expected.internal_rate_of_return);
    }

    #[test]
    fn test_investment_metrics_cover_defined_iterations_only() {
        let rows = vec![
            (0, vec![1000.0, -300.0, -300.0, -300.0, -300.0]),
            (1, vec![100.0, -100.0, 0.0, 0.0, 0.0]),
            (2, vec![50.0, 10.0, 10.0, 10.0, 10.0]),
        ];
        let mut collector = StatisticsCollector::new(&config(5), vec!["All".into()]);
        ingest_all(&mut collector, 0.05, &rows);
        let summary = collector.finalize();

        assert_eq!(summary.payback_period.defined, 2);
        let payback = summary.payback_period.distribution.unwrap();
        assert_eq!(payback.min, 1.0);
        assert!(close(payback.max, 3.0 + 1.0 / 3.0));
        assert!(close(payback.mean, (4.0 + 1.0 / 3.0) / 2.0));
        assert_eq!(payback.percentile(0.0), None);
        assert!(close(payback.percentile(0.5).unwrap(), payback.mean));

        assert_eq!(summary.internal_rate_of_return.defined, 2);
        let irr = summary.internal_rate_of_return.distribution.unwrap();
        assert_eq!(irr.min, 0.0);
        assert!(irr.max > 0.07 && irr.max < 0.08, "got {}", irr.max);
    }

    #[test]
    fn test_investment_metrics_undefined_for_cost_only_runs() {
        let rows: Vec<_> = (0..10).map(|i| (i, vec![60.0, 40.0])).collect();
        let mut collector = StatisticsCollector::new(&config(2), vec!["All".into()]);
        ingest_all(&mut collector, 0.0, &rows);
        let summary = collector.finalize();

        assert_eq!(summary.payback_period.defined, 0);
        assert_eq!(summary.payback_period.distribution, None);
        assert_eq!(summary.internal_rate_of_return.defined, 0);
        assert_eq!(summary.internal_rate_of_return.distribution, None);
    }

    #[test]
    fn test_merge_with_empty_collector() {
        let rows = vec![(0, vec![1.0]), (1, vec![3.0])];
        let mut a = StatisticsCollector::new(&config(1), vec!["All".into()]);
        ingest_all(&mut a, 0.0, &rows);
        let mut empty = StatisticsCollector::new(&config(1), vec!["All".into()]);
        empty.merge(a);

        let summary = empty.finalize();
        assert_eq!(summary.present_value_total.mean, 2.0);
        assert_eq!(summary.present_value_total.std_dev, 1.0);
    }

    #[test]
    fn test_group_breakdown_and_representatives() {
        let mut collector = StatisticsCollector::new(&config(1), vec!["All".into()]);
        let rows: Vec<_> = (0..5).map(|i| (i, vec![(i * 10) as f64])).collect();
        ingest_all(&mut collector, 0.0, &rows);

        let summary = collector.finalize();
        let group = summary.group("All").unwrap();
        assert_eq!(group.mean_nominal_by_year, vec![20.0]);
        assert_eq!(group.mean_nominal_total, 20.0);

        let median = summary
            .representative_iterations
            .iter()
            .find(|r| r.percentile == 0.5)
            .unwrap();
        assert_eq!(median.iteration, 2);
        assert_eq!(median.present_value, 20.0);
    }
}
