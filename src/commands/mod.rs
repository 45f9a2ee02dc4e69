//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod demo;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use demo::{execute_demo, simulate_request, validate_args};
pub use models::DemoArgs;
pub use utils::{display_schema, display_version, print_profile_summary, validate_profile_file};
