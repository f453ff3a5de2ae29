//! Present-value discounting
//!
//! Year 1 is the simulation's start year and is not discounted. Year `y` is
//! divided by `(1 + r)^(y - 1)`.

use crate::error::ConfigError;
use crate::model::PresentValue;

/// Converts nominal per-year costs to present value under a fixed rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discounter {
    rate: f64,
}

impl Discounter {
    pub fn new(rate: f64) -> Result<Self, ConfigError> {
        if !rate.is_finite() || rate <= -1.0 {
            return Err(ConfigError::InvalidInterestRate(rate));
        }
        Ok(Self { rate })
    }

    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Multiplier that brings a year-`year` amount back to year 1
    #[must_use]
    #[inline]
    pub fn factor(&self, year: u32) -> f64 {
        let exponent = i32::try_from(year.saturating_sub(1)).unwrap_or(i32::MAX);
        1.0 / (1.0 + self.rate).powi(exponent)
    }

    /// `nominal[i]` is treated as year `i + 1`
    #[must_use]
    pub fn present_values(&self, nominal: &[f64]) -> Vec<f64> {
        (1..)
            .zip(nominal)
            .map(|(year, value)| value * self.factor(year))
            .collect()
    }

    #[must_use]
    pub fn total(&self, nominal: &[f64]) -> f64 {
        self.present_values(nominal).iter().sum()
    }

    #[must_use]
    pub fn discount(&self, nominal: &[f64]) -> PresentValue {
        let values = self.present_values(nominal);
        let total = values.iter().sum();
        PresentValue { values, total }
    }
}
