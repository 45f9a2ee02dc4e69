//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::time::Duration;
use thiserror::Error;

/// Recorded children ran longer than the step that contains them.
///
/// This points at broken step boundaries, so it is never clamped away.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Child steps exceed parent step size: '{step}' took {parent:?} but its children took {children:?}")]
pub struct CalculationError {
    /// Display name of the offending step
    pub step: String,

    /// Duration stamped on the step itself
    pub parent: Duration,

    /// Sum of the durations of its children
    pub children: Duration,
}

/// Errors that can occur while aggregating a trace
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error("Step is still open: {0}")]
    Unfinished(String),
}

/// Errors that can occur while rebuilding a trace from an exported profile
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid profile format: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur while writing or reading profile files
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to read file: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error(transparent)]
    InvalidProfile(#[from] ParseError),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
