use std::fmt;

/// Errors raised while building or validating the cash-flow model
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    InvalidParameter {
        distribution: &'static str,
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },
    InvalidYearWindow {
        start: Option<u32>,
        end: Option<u32>,
        reason: &'static str,
    },
    InvalidName {
        kind: &'static str,
        name: String,
    },
    DuplicateName {
        kind: &'static str,
        name: String,
    },
    /// A sheet must own at least one group
    EmptySheet,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidParameter {
                distribution,
                parameter,
                value,
                reason,
            } => {
                write!(
                    f,
                    "invalid {distribution} parameter {parameter}={value}: {reason}"
                )
            }
            ModelError::InvalidYearWindow { start, end, reason } => {
                write!(f, "invalid year window ({start:?}, {end:?}): {reason}")
            }
            ModelError::InvalidName { kind, name } => {
                write!(f, "invalid {kind} name {name:?}: must not be empty")
            }
            ModelError::DuplicateName { kind, name } => {
                write!(f, "duplicate {kind} name {name:?}")
            }
            ModelError::EmptySheet => write!(f, "cash-flow sheet has no groups"),
        }
    }
}

impl std::error::Error for ModelError {}

/// Errors raised while validating a `SimulationConfig`
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositiveYears(i64),
    NonPositiveIterations(i64),
    /// Year count does not fit a `u32`
    TooManyYears(i64),
    /// Iteration count does not fit a `usize`
    TooManyIterations(i64),
    /// Rate must be finite and greater than -100%
    InvalidInterestRate(f64),
    /// Percentiles are fractions in [0, 1]
    InvalidPercentile(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveYears(years) => {
                write!(f, "years must be positive, got {years}")
            }
            ConfigError::NonPositiveIterations(iterations) => {
                write!(f, "iterations must be positive, got {iterations}")
            }
            ConfigError::TooManyYears(years) => {
                write!(f, "years must be at most {}, got {years}", u32::MAX)
            }
            ConfigError::TooManyIterations(iterations) => {
                write!(f, "iterations must be at most {}, got {iterations}", usize::MAX)
            }
            ConfigError::InvalidInterestRate(rate) => {
                write!(f, "interest rate {rate} must be finite and greater than -1")
            }
            ConfigError::InvalidPercentile(p) => {
                write!(f, "percentile {p} must lie within [0, 1]")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level engine error
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    InvalidParameter(ModelError),
    InvalidConfig(ConfigError),
    /// Cooperative cancellation was observed between iterations.
    /// Partial statistics are discarded.
    RunAborted { completed: usize },
    /// Should be unreachable for a validated model; always fatal.
    InternalInvariantViolation(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidParameter(e) => write!(f, "{e}"),
            SimulationError::InvalidConfig(e) => write!(f, "{e}"),
            SimulationError::RunAborted { completed } => {
                write!(f, "simulation aborted after {completed} iterations")
            }
            SimulationError::InternalInvariantViolation(msg) => {
                write!(f, "internal invariant violated: {msg}")
            }
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::InvalidParameter(e) => Some(e),
            SimulationError::InvalidConfig(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for SimulationError {
    fn from(err: ModelError) -> Self {
        SimulationError::InvalidParameter(err)
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::InvalidConfig(err)
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
