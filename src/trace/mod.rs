//! Trace data model.
//!
//! This module defines:
//! - The closed set of layers and per-layer fractions
//! - Step descriptors and arena nodes
//! - Finished trace trees and a builder for them

pub mod layer;
pub mod node;
pub mod tree;

// Re-export main types
pub use layer::{Layer, LayerPortions, LayerTotals};
pub use node::{Node, NodeId, NodeState, Step};
pub use tree::{Trace, TraceBuilder};
