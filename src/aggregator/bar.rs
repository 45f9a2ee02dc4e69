//! Per-layer bar widths.
//!
//! A step's bar is as wide as its share of the whole trace, split into one
//! segment per layer by its layer portions.

use super::metrics::StepEntry;
use crate::trace::{Layer, LayerPortions, NodeId, Trace};
use crate::utils::config::{LABEL_MIN_WIDTH, MIN_SEGMENT_WIDTH};
use crate::utils::error::AggregateError;

/// One layer's slice of a bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSegment {
    pub layer: Layer,

    /// Width in the same unit as the requested full width
    pub width: f64,

    /// Layer initial, present when the segment is wide enough to show it
    pub label: Option<char>,
}

/// Segments for every layer, in display order
pub fn bar_segments(portions: &LayerPortions, proportion: f64, full_width: f64) -> Vec<BarSegment> {
    portions
        .iter()
        .map(|(layer, portion)| {
            let width = segment_width(portion, proportion, full_width);
            BarSegment {
                layer,
                width,
                label: (width >= LABEL_MIN_WIDTH).then(|| layer.initial()),
            }
        })
        .collect()
}

/// Bar for a recorded node
pub fn bar_for(trace: &Trace, id: NodeId, full_width: f64) -> Result<Vec<BarSegment>, AggregateError> {
    bar_for_entry(trace, &StepEntry::Recorded(id), full_width)
}

/// Bar for a recorded node or an `(Other)` entry
///
/// **Public** - main entry point for bar rendering
///
/// # Arguments
/// * `trace` - Finished trace
/// * `entry` - Recorded node or `(Other)` entry
/// * `full_width` - Width of a bar spanning the whole trace
///
/// # Returns
/// One segment per layer, in display order
///
/// # Errors
/// Any aggregation error of the entry
pub fn bar_for_entry(
    trace: &Trace,
    entry: &StepEntry,
    full_width: f64,
) -> Result<Vec<BarSegment>, AggregateError> {
    let portions = entry.layer_portions(trace)?;
    let proportion = entry.proportion(trace)?;
    Ok(bar_segments(&portions, proportion, full_width))
}

fn segment_width(portion: f64, proportion: f64, full_width: f64) -> f64 {
    let width = portion * full_width * proportion;
    if width < MIN_SEGMENT_WIDTH && portion != 0.0 {
        MIN_SEGMENT_WIDTH
    } else {
        width
    }
}
