//! Aggregation of finished traces into per-node metrics.
//!
//! This module derives, read-only, from a finished trace:
//! - Disparity, layer portions and proportion of every node
//! - Per-layer bar widths
//! - Collapsed stacks and hot paths
//! - Steps whose time is mostly unaccounted for

pub mod bar;
pub mod hot_paths;
pub mod metrics;
pub mod stack_builder;
pub mod unaccounted;

// Re-export main types and functions
pub use bar::{bar_for, bar_for_entry, bar_segments, BarSegment};
pub use hot_paths::{calculate_hot_paths, create_hot_path};
pub use metrics::{
    children_with_disparity, disparity, effective_layer, finished_duration, layer_portions,
    proportion, verify_trace, OtherStep, StepEntry,
};
pub use stack_builder::{build_collapsed_stacks, collapsed_text, CollapsedStack};
pub use unaccounted::find_unaccounted_steps;
