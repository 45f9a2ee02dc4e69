//! Step recording.
//!
//! This module handles:
//! - The explicit, handle-based recording stack
//! - A thread-local front end for code without a handle

pub mod ambient;
pub mod stack;

// Re-export main types
pub use stack::{Recorder, StepGuard};
