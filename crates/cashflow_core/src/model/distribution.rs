use std::fmt;

use rand::{Rng, distr::Distribution as _};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

fn default_pareto_scale() -> f64 {
    1.0
}

/// A scalar cost distribution.
///
/// Exactly one variant is active per value. Use the checked constructors
/// (`gaussian`, `constant`, `pareto`) so parameters are rejected at load time
/// rather than while sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Distribution {
    Gaussian {
        mu: f64,
        sigma: f64,
    },
    Constant {
        value: f64,
    },
    /// Pareto with shape `alpha` and minimum `scale` (1.0 unless configured).
    Pareto {
        alpha: f64,
        #[serde(default = "default_pareto_scale")]
        scale: f64,
    },
}

impl Default for Distribution {
    fn default() -> Self {
        Distribution::Constant { value: 0.0 }
    }
}

impl Distribution {
    pub fn gaussian(mu: f64, sigma: f64) -> Result<Self, ModelError> {
        let dist = Distribution::Gaussian { mu, sigma };
        dist.validate()?;
        Ok(dist)
    }

    pub fn constant(value: f64) -> Result<Self, ModelError> {
        let dist = Distribution::Constant { value };
        dist.validate()?;
        Ok(dist)
    }

    /// Standard Pareto with scale 1
    pub fn pareto(alpha: f64) -> Result<Self, ModelError> {
        Self::pareto_with_scale(alpha, 1.0)
    }

    pub fn pareto_with_scale(alpha: f64, scale: f64) -> Result<Self, ModelError> {
        let dist = Distribution::Pareto { alpha, scale };
        dist.validate()?;
        Ok(dist)
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Distribution::Gaussian { .. } => "Gaussian",
            Distribution::Constant { .. } => "Constant",
            Distribution::Pareto { .. } => "Pareto",
        }
    }

    /// Check the parameter invariants of the active variant.
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |parameter, value, reason| ModelError::InvalidParameter {
            distribution: self.kind(),
            parameter,
            value,
            reason,
        };

        match *self {
            Distribution::Gaussian { mu, sigma } => {
                if !mu.is_finite() {
                    return Err(invalid("mu", mu, "must be finite"));
                }
                if !sigma.is_finite() || sigma < 0.0 {
                    return Err(invalid("sigma", sigma, "must be non-negative and finite"));
                }
            }
            Distribution::Constant { value } => {
                if !value.is_finite() {
                    return Err(invalid("value", value, "must be finite"));
                }
            }
            Distribution::Pareto { alpha, scale } => {
                if !alpha.is_finite() || alpha <= 0.0 {
                    return Err(invalid("alpha", alpha, "must be positive and finite"));
                }
                if !scale.is_finite() || scale <= 0.0 {
                    return Err(invalid("scale", scale, "must be positive and finite"));
                }
            }
        }
        Ok(())
    }

    /// Draw one value.
    ///
    /// `Constant` and zero-sigma `Gaussian` never touch `rng`, so the entropy
    /// stream of an iteration does not depend on which degenerate
    /// distributions are present.
    ///
    /// Parameters are re-checked before drawing: `rand_distr::Normal` accepts
    /// a negative `sigma` and a non-finite `mu`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, ModelError> {
        self.validate()?;
        match *self {
            Distribution::Constant { value } => Ok(value),
            Distribution::Gaussian { mu, sigma } if sigma == 0.0 => Ok(mu),
            Distribution::Gaussian { mu, sigma } => rand_distr::Normal::new(mu, sigma)
                .map(|d| d.sample(rng))
                .map_err(|_| ModelError::InvalidParameter {
                    distribution: "Gaussian",
                    parameter: "sigma",
                    value: sigma,
                    reason: "must be non-negative and finite",
                }),
            Distribution::Pareto { alpha, scale } => rand_distr::Pareto::new(scale, alpha)
                .map(|d| d.sample(rng))
                .map_err(|_| ModelError::InvalidParameter {
                    distribution: "Pareto",
                    parameter: "alpha",
                    value: alpha,
                    reason: "shape and scale must be positive and finite",
                }),
        }
    }

    /// Expected value, if finite (Pareto with alpha <= 1 has none)
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        match *self {
            Distribution::Gaussian { mu, .. } => Some(mu),
            Distribution::Constant { value } => Some(value),
            Distribution::Pareto { alpha, scale } => {
                (alpha > 1.0).then(|| alpha * scale / (alpha - 1.0))
            }
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Gaussian { mu, sigma } => write!(
                f,
                "Gaussian distribution with mu={mu:.2} and sigma={sigma:.2}"
            ),
            Distribution::Constant { value } => write!(f, "Constant with a value of {value:.2}"),
            Distribution::Pareto { alpha, scale } if *scale == 1.0 => {
                write!(f, "Pareto distribution with alpha of {alpha:.2}")
            }
            Distribution::Pareto { alpha, scale } => write!(
                f,
                "Pareto distribution with alpha of {alpha:.2} and scale of {scale:.2}"
            ),
        }
    }
}
