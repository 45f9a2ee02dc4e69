//! Output JSON schema definitions for profile data.
//!
//! This module defines the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::trace::{Layer, LayerPortions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level profile structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Schema version for compatibility checking
    pub version: String,

    /// What was profiled (e.g. "GET /users")
    pub label: String,

    /// Total trace duration in milliseconds
    pub total_ms: f64,

    /// Layer breakdown of the whole trace
    pub layer_portions: LayerPortions,

    /// Top hot paths (ranked by self time)
    pub hot_paths: Vec<HotPath>,

    /// Steps that spend most of their time outside their child steps
    #[serde(default)]
    pub unaccounted: Vec<UnaccountedStep>,

    /// The step tree
    pub root: StepExport,

    /// Timestamp when profile was generated
    pub generated_at: String,
}

/// One node of the exported step tree.
///
/// The root omits `name` and `layer`. Below the root, every node with
/// children also lists a trailing `(Other)` entry marked `synthetic`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepExport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<Layer>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, String>,

    /// Duration in seconds
    pub time: f64,

    #[serde(default, skip_serializing_if = "is_false")]
    pub synthetic: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_portions: Option<LayerPortions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proportion: Option<f64>,

    #[serde(default)]
    pub children: Vec<StepExport>,
}

/// A hot path in the trace (stack with self time)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotPath {
    /// Collapsed stack representation (e.g., "request;Index;Find users")
    pub stack: String,

    /// Self time of this path in microseconds
    pub micros: u64,

    /// Percentage of total trace time
    pub percentage: f64,
}

/// A step whose own `(Other)` time dominates its duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaccountedStep {
    /// Collapsed stack of the step (e.g., "request;Index")
    pub stack: String,

    /// Disparity of the step in microseconds
    pub micros: u64,

    /// Disparity as a fraction of the step's duration
    pub share: f64,
}

fn is_false(value: &bool) -> bool {
    !*value
}
