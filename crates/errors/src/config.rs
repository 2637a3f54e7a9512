//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("invalid config: {message}")]
    Invalid { message: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("{what} has {actual} resource types, expected {expected}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error(
        "maximum demand of consumer {consumer} for resource {resource} is {maximum}, \
         above capacity {capacity}"
    )]
    MaximumExceedsCapacity {
        consumer: usize,
        resource: usize,
        maximum: u32,
        capacity: u32,
    },

    #[error("initial allocation is not a safe state")]
    UnsafeInitialState,
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Provide a configuration file with --config."),
            Self::MissingField { .. } => {
                Some("Add the missing configuration field noted in the error message.")
            }
            Self::InvalidValue { .. } | Self::Invalid { .. } | Self::ParseError { .. } => {
                Some("Fix the configuration value and retry the command.")
            }
            Self::DimensionMismatch { .. } => {
                Some("Pass one capacity per resource type and size every maximum row to match.")
            }
            Self::MaximumExceedsCapacity { .. } => {
                Some("Lower the maximum demand or raise the capacity of that resource type.")
            }
            Self::UnsafeInitialState => {
                Some("Reduce the initial allocation so every consumer can still finish.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "config.not_found",
            Self::Invalid { .. } => "config.invalid",
            Self::ParseError { .. } => "config.parse_error",
            Self::MissingField { .. } => "config.missing_field",
            Self::InvalidValue { .. } => "config.invalid_value",
            Self::DimensionMismatch { .. } => "config.dimension_mismatch",
            Self::MaximumExceedsCapacity { .. } => "config.maximum_exceeds_capacity",
            Self::UnsafeInitialState => "config.unsafe_initial_state",
        };
        Some(code)
    }
}
