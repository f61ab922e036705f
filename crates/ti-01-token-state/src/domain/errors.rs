//! # Domain Errors
//!
//! The recency set and ownership registry have no failure modes: absence is
//! an ordinary answer. Errors here belong to the surrounding pipeline.

use thiserror::Error;

use crate::ports::{SinkError, ValidatorError};

/// Invalid state configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroCapacity { field: &'static str },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnvValue { key: &'static str, value: String },
}

/// Errors surfaced while processing a stream event.
///
/// When one of these is returned the core state has not been mutated for
/// the failing transaction.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Validator error: {0}")]
    Validator(#[from] ValidatorError),

    #[error("Record sink error: {0}")]
    Sink(#[from] SinkError),
}
