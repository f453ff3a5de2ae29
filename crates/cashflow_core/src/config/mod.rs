//! Simulation configuration
//!
//! `SimulationConfig` holds the run parameters: discount rate, horizon and
//! iteration count, plus the run-level seed and the percentiles to report.
//! The cash-flow tree itself is a `CashFlowSheet`, built directly or through
//! the builder DSL:
//!
//! ```ignore
//! use cashflow_core::config::{GroupBuilder, ItemBuilder, SheetBuilder};
//! use cashflow_core::model::Distribution;
//!
//! let sheet = SheetBuilder::new()
//!     .group(GroupBuilder::new("Hardware")
//!         .item(ItemBuilder::new("Server")
//!             .upfront(Distribution::Constant { value: 100.0 })
//!             .upfront_in_year(1)
//!             .recurring(Distribution::Gaussian { mu: 10.0, sigma: 2.0 })
//!             .recurring_years(1, 3)))
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub mod builder;

pub use builder::{GroupBuilder, ItemBuilder, SheetBuilder};

fn default_interest_rate() -> f64 {
    0.10
}

fn default_years() -> u32 {
    10
}

fn default_iterations() -> usize {
    10_000
}

fn default_percentiles() -> Vec<f64> {
    vec![0.05, 0.50, 0.95]
}

fn default_true() -> bool {
    true
}

/// Run parameters, supplied once per run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Annual discount rate; may be negative but must exceed -1
    #[serde(default = "default_interest_rate")]
    pub interest_rate: f64,
    /// Horizon length in years
    #[serde(default = "default_years")]
    pub years: u32,
    /// Number of Monte Carlo repetitions
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Run-level seed; iteration `k` is seeded from `(seed, k)`
    #[serde(default)]
    pub seed: u64,
    /// Percentiles (0-1) reported for the whole-horizon totals
    #[serde(default = "default_percentiles")]
    pub percentiles: Vec<f64>,
    /// Retain per-year samples so per-year percentiles are exact.
    /// Costs `years * iterations` floats of memory.
    #[serde(default = "default_true")]
    pub yearly_percentiles: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interest_rate: default_interest_rate(),
            years: default_years(),
            iterations: default_iterations(),
            seed: 0,
            percentiles: default_percentiles(),
            yearly_percentiles: true,
        }
    }
}

impl SimulationConfig {
    #[must_use]
    pub fn new(interest_rate: f64, years: u32, iterations: usize) -> Self {
        Self {
            interest_rate,
            years,
            iterations,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_percentiles(mut self, percentiles: impl Into<Vec<f64>>) -> Self {
        self.percentiles = percentiles.into();
        self
    }

    #[must_use]
    pub fn with_yearly_percentiles(mut self, enabled: bool) -> Self {
        self.yearly_percentiles = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.years == 0 {
            return Err(ConfigError::NonPositiveYears(0));
        }
        if self.iterations == 0 {
            return Err(ConfigError::NonPositiveIterations(0));
        }
        if !self.interest_rate.is_finite() || self.interest_rate <= -1.0 {
            return Err(ConfigError::InvalidInterestRate(self.interest_rate));
        }
        if let Some(p) = self
            .percentiles
            .iter()
            .find(|p| !(0.0..=1.0).contains(*p))
        {
            return Err(ConfigError::InvalidPercentile(*p));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.years, 10);
        assert_eq!(config.iterations, 10_000);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert_eq!(
            SimulationConfig::new(0.1, 0, 10).validate(),
            Err(ConfigError::NonPositiveYears(0))
        );
        assert_eq!(
            SimulationConfig::new(0.1, 5, 0).validate(),
            Err(ConfigError::NonPositiveIterations(0))
        );
        assert!(SimulationConfig::new(-1.0, 5, 10).validate().is_err());
        assert!(SimulationConfig::new(f64::NAN, 5, 10).validate().is_err());
        assert!(
            SimulationConfig::new(0.1, 5, 10)
                .with_percentiles([0.5, 1.5])
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_negative_rate_allowed() {
        assert!(SimulationConfig::new(-0.02, 5, 10).validate().is_ok());
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"years": 3, "iterations": 50}"#).unwrap();
        assert_eq!(config.years, 3);
        assert_eq!(config.iterations, 50);
        assert_eq!(config.interest_rate, 0.10);
        assert_eq!(config.percentiles, vec![0.05, 0.50, 0.95]);
        assert!(config.yearly_percentiles);
    }
}
