//! Configuration and constants for aggregation and output.

use crate::trace::Layer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Label of the synthetic entry that carries a step's unaccounted time
pub const OTHER_STEP_NAME: &str = "(Other)";

/// Frame name used for the root node in collapsed stacks and summaries
pub const ROOT_FRAME_NAME: &str = "request";

/// Full bar width in pixels for a step that spans the whole trace
pub const DEFAULT_BAR_WIDTH: f64 = 200.0;

/// Non-empty layer segments never render narrower than this
pub const MIN_SEGMENT_WIDTH: f64 = 1.0;

/// Segments at least this wide carry their layer initial
pub const LABEL_MIN_WIDTH: f64 = 12.0;

/// Steps whose `(Other)` share reaches this are reported as mostly unaccounted
pub const UNACCOUNTED_SHARE_THRESHOLD: f64 = 0.5;

/// How time of steps recorded without a layer is attributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnclassifiedPolicy {
    /// Use the nearest classified ancestor's layer, or `fallback` when
    /// no ancestor has one (the root always resolves to `fallback`)
    Inherit { fallback: Layer },

    /// Always attribute to the given layer
    Attribute(Layer),
}

impl Default for UnclassifiedPolicy {
    fn default() -> Self {
        Self::Inherit {
            fallback: Layer::Controller,
        }
    }
}

impl fmt::Display for UnclassifiedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inherit { fallback } => write!(f, "inherit:{}", fallback),
            Self::Attribute(layer) => write!(f, "{}", layer),
        }
    }
}

impl FromStr for UnclassifiedPolicy {
    type Err = String;

    /// Accepts `inherit`, `inherit:<layer>` or a bare layer name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.split_once(':') {
            Some(("inherit", fallback)) => Ok(Self::Inherit {
                fallback: fallback.parse()?,
            }),
            Some(_) => Err(format!("Unknown unclassified policy: {}", s)),
            None if s == "inherit" => Ok(Self::default()),
            None => Ok(Self::Attribute(s.parse()?)),
        }
    }
}

/// Aggregation settings carried by every trace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Attribution for steps without a layer
    pub unclassified: UnclassifiedPolicy,
}

impl AggregationConfig {
    pub fn new(unclassified: UnclassifiedPolicy) -> Self {
        Self { unclassified }
    }
}
