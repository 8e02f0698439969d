//! Error type for parameter lookup and validation.

use std::error::Error;
use std::fmt;

/// Errors raised while reading the string-keyed parameter map.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamError {
    /// A required key is absent. Fatal at initialization.
    Missing {
        /// The absent key.
        key: String,
    },
    /// A key is present but its value is unusable.
    Invalid {
        /// The offending key.
        key: String,
        /// The rejected value.
        value: f64,
        /// What the value must satisfy.
        reason: String,
    },
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key } => write!(f, "missing required parameter '{key}'"),
            Self::Invalid { key, value, reason } => {
                write!(f, "parameter '{key}' = {value} is invalid: {reason}")
            }
        }
    }
}

impl Error for ParamError {}
