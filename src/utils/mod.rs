//! Utility modules for configuration and error handling.

pub mod error;
pub mod config;

// Re-export commonly used types for convenience
pub use config::{AggregationConfig, UnclassifiedPolicy};
pub use error::{AggregateError, CalculationError, OutputError, ParseError};
