use std::fmt;

use cashflow_core::{ConfigError, ModelError};

/// Errors raised while reading or writing a scenario document
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The document is not valid YAML or does not match the scenario shape
    Syntax(String),
    /// A year bound that is neither empty nor a positive integer
    InvalidYear { field: String, value: String },
    /// A distribution is missing one of its required parameters
    MissingParameter { field: String, parameter: &'static str },
    Model(ModelError),
    Config(ConfigError),
    Serialize(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax(msg) => write!(f, "Parse error: {}", msg),
            ParseError::InvalidYear { field, value } => {
                write!(f, "Invalid year {:?} for {}", value, field)
            }
            ParseError::MissingParameter { field, parameter } => {
                write!(f, "Missing parameter '{}' for {}", parameter, field)
            }
            ParseError::Model(e) => write!(f, "Invalid model: {}", e),
            ParseError::Config(e) => write!(f, "Invalid config: {}", e),
            ParseError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Model(e) => Some(e),
            ParseError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for ParseError {
    fn from(err: ModelError) -> Self {
        ParseError::Model(err)
    }
}

impl From<ConfigError> for ParseError {
    fn from(err: ConfigError) -> Self {
        ParseError::Config(err)
    }
}
