//! Output of finished traces.
//!
//! This module handles:
//! - The versioned, tree-shaped export schema
//! - Export to and import from that schema
//! - JSON and text files on disk
//! - Terminal summaries

pub mod export;
pub mod json;
pub mod schema;
pub mod summary;

// Re-export main functions
pub use export::{export_tree, import_profile, import_tree, to_profile};
pub use json::{profile_to_string, read_profile, write_profile, write_text};
pub use schema::{HotPath, Profile, StepExport, UnaccountedStep};
pub use summary::{generate_text_summary, SummaryConfig};
