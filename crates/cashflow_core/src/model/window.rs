//! Active year windows and the costs bound to them
//!
//! Years are 1-based: year 1 is the first simulated year. A missing bound is
//! unbounded on that side, which resolves to year 1 for the start and to the
//! simulation horizon for the end.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::distribution::Distribution;
use crate::error::ModelError;

/// Inclusive range of simulation years in which a cost is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YearWindow {
    #[serde(default)]
    start: Option<u32>,
    #[serde(default)]
    end: Option<u32>,
}

impl YearWindow {
    pub fn new(start: Option<u32>, end: Option<u32>) -> Result<Self, ModelError> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// Active in every year of the horizon
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Active in exactly one year
    pub fn single(year: u32) -> Result<Self, ModelError> {
        Self::new(Some(year), Some(year))
    }

    pub fn starting(year: u32) -> Result<Self, ModelError> {
        Self::new(Some(year), None)
    }

    pub fn until(year: u32) -> Result<Self, ModelError> {
        Self::new(None, Some(year))
    }

    pub fn between(start: u32, end: u32) -> Result<Self, ModelError> {
        Self::new(Some(start), Some(end))
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.start == Some(0) || self.end == Some(0) {
            return Err(ModelError::InvalidYearWindow {
                start: self.start,
                end: self.end,
                reason: "years are numbered from 1",
            });
        }
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(ModelError::InvalidYearWindow {
                start: self.start,
                end: self.end,
                reason: "start year is after end year",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn start(&self) -> Option<u32> {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Option<u32> {
        self.end
    }

    /// First active year; an unbounded start is year 1
    #[must_use]
    pub fn first_year(&self) -> u32 {
        self.start.unwrap_or(1)
    }

    /// Last active year within `horizon`
    #[must_use]
    pub fn last_year(&self, horizon: u32) -> u32 {
        self.end.map_or(horizon, |end| end.min(horizon))
    }

    #[must_use]
    pub fn contains(&self, year: u32, horizon: u32) -> bool {
        year >= self.first_year() && year <= self.last_year(horizon)
    }
}

impl fmt::Display for YearWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (None, None) => Ok(()),
            (Some(start), None) => write!(f, ", starting in year {start}"),
            (None, Some(end)) => write!(f, ", ending in year {end}"),
            (Some(start), Some(end)) => {
                write!(f, ", starting in year {start}, ending in year {end}")
            }
        }
    }
}

/// A distribution together with the years in which it is drawn
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cost {
    pub distribution: Distribution,
    #[serde(default)]
    pub window: YearWindow,
}

impl Cost {
    #[must_use]
    pub fn new(distribution: Distribution, window: YearWindow) -> Self {
        Self {
            distribution,
            window,
        }
    }

    /// Cost active in every year of the horizon
    #[must_use]
    pub fn always(distribution: Distribution) -> Self {
        Self::new(distribution, YearWindow::unbounded())
    }

    /// A cost that is never incurred
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.distribution.validate()?;
        self.window.validate()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, ModelError> {
        self.distribution.sample(rng)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.distribution, self.window)
    }
}
