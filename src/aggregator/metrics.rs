//! Per-node metrics over a finished trace.
//!
//! Every query takes the trace and a node id, and fails fast with
//! [`AggregateError::Unfinished`] when a node it depends on is still open.
//! A node's time decomposes into its children's durations plus its
//! *disparity*, the time spent directly in the node.

use crate::trace::{Layer, LayerPortions, LayerTotals, NodeId, Trace};
use crate::utils::config::{UnclassifiedPolicy, OTHER_STEP_NAME};
use crate::utils::error::{AggregateError, CalculationError};
use log::debug;
use std::time::Duration;

/// Synthetic entry holding a node's unaccounted time.
///
/// Presentation only; never part of the tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OtherStep {
    /// Node whose disparity this is
    pub owner: NodeId,

    /// The owner's own layer
    pub layer: Option<Layer>,

    /// The owner's disparity
    pub duration: Duration,

    /// The owner's parent, so the entry sits beside its siblings
    pub parent: Option<NodeId>,
}

/// One element of [`children_with_disparity`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepEntry {
    Recorded(NodeId),
    Other(OtherStep),
}

impl StepEntry {
    pub fn name<'a>(&self, trace: &'a Trace) -> &'a str {
        match self {
            StepEntry::Recorded(id) => trace.node(*id).display_name(),
            StepEntry::Other(_) => OTHER_STEP_NAME,
        }
    }

    pub fn duration(&self, trace: &Trace) -> Result<Duration, AggregateError> {
        match self {
            StepEntry::Recorded(id) => finished_duration(trace, *id),
            StepEntry::Other(other) => Ok(other.duration),
        }
    }

    pub fn layer_portions(&self, trace: &Trace) -> Result<LayerPortions, AggregateError> {
        match self {
            StepEntry::Recorded(id) => layer_portions(trace, *id),
            StepEntry::Other(other) => Ok(LayerPortions::whole(effective_layer(trace, other.owner))),
        }
    }

    pub fn proportion(&self, trace: &Trace) -> Result<f64, AggregateError> {
        match self {
            StepEntry::Recorded(id) => proportion(trace, *id),
            StepEntry::Other(other) => share_of_root(trace, other.owner, other.duration, false),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, StepEntry::Other(_))
    }
}

/// Duration of a closed node
pub fn finished_duration(trace: &Trace, id: NodeId) -> Result<Duration, AggregateError> {
    let node = trace.node(id);
    node.duration()
        .ok_or_else(|| AggregateError::Unfinished(node.display_name().to_string()))
}

/// Layer a node's time is attributed to.
///
/// A node's own layer wins; otherwise the trace's [`UnclassifiedPolicy`]
/// decides.
pub fn effective_layer(trace: &Trace, id: NodeId) -> Layer {
    match trace.config().unclassified {
        UnclassifiedPolicy::Attribute(layer) => trace.node(id).layer().unwrap_or(layer),
        UnclassifiedPolicy::Inherit { fallback } => {
            let mut current = Some(id);
            while let Some(node_id) = current {
                let node = trace.node(node_id);
                if let Some(layer) = node.layer() {
                    return layer;
                }
                current = node.parent();
            }
            fallback
        }
    }
}

/// Time spent in a node not covered by any of its children
///
/// **Public** - the base quantity every other metric builds on
///
/// # Arguments
/// * `trace` - Finished trace
/// * `id` - Node to inspect
///
/// # Returns
/// The node's duration minus the sum of its children's durations
///
/// # Errors
/// * `AggregateError::Calculation` - children add up to more than the node
/// * `AggregateError::Unfinished` - the node or a child is still open
pub fn disparity(trace: &Trace, id: NodeId) -> Result<Duration, AggregateError> {
    let duration = finished_duration(trace, id)?;

    let mut children = Duration::ZERO;
    for &child in trace.node(id).children() {
        children += finished_duration(trace, child)?;
    }

    duration.checked_sub(children).ok_or_else(|| {
        CalculationError {
            step: trace.node(id).display_name().to_string(),
            parent: duration,
            children,
        }
        .into()
    })
}

/// A node's children followed by an `(Other)` entry for its disparity.
///
/// **Public** - used by export and the text summary
///
/// # Returns
/// Children in start order plus a trailing `(Other)` entry. Childless
/// nodes have nothing to decompose and yield an empty list.
///
/// # Errors
/// Same as [`disparity`]
pub fn children_with_disparity(trace: &Trace, id: NodeId) -> Result<Vec<StepEntry>, AggregateError> {
    let node = trace.node(id);
    if node.children().is_empty() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<StepEntry> = node
        .children()
        .iter()
        .map(|&child| StepEntry::Recorded(child))
        .collect();

    entries.push(StepEntry::Other(OtherStep {
        owner: id,
        layer: node.layer(),
        duration: disparity(trace, id)?,
        parent: node.parent(),
    }));

    Ok(entries)
}

/// Fraction of a node's own duration spent in each layer.
///
/// **Public** - main entry point for layer breakdowns
///
/// # Arguments
/// * `trace` - Finished trace
/// * `id` - Node to break down
///
/// # Returns
/// Fractions that sum to 1.0. Children contribute their full duration to
/// their effective layer; the node's disparity goes to the node's
/// effective layer. Computed once per node and cached.
///
/// # Errors
/// Same as [`disparity`], for every node with children
pub fn layer_portions(trace: &Trace, id: NodeId) -> Result<LayerPortions, AggregateError> {
    let node = trace.node(id);
    if let Some(cached) = node.portions.get() {
        return Ok(*cached);
    }

    let duration = finished_duration(trace, id)?;
    let own_layer = effective_layer(trace, id);

    let portions = if node.children().is_empty() {
        LayerPortions::whole(own_layer)
    } else {
        let unaccounted = disparity(trace, id)?;
        if duration.is_zero() {
            // Disparity held, so every child is zero-length too
            LayerPortions::whole(own_layer)
        } else {
            let mut totals = LayerTotals::default();
            for &child in node.children() {
                totals.add(effective_layer(trace, child), finished_duration(trace, child)?);
            }
            totals.add(own_layer, unaccounted);
            totals.fractions_of(duration)
        }
    };

    debug!("Layer portions for '{}': {:?}", node.display_name(), portions);
    // Nothing else writes this cell, so a failed set means an identical value.
    let _ = node.portions.set(portions);
    Ok(portions)
}

/// A node's share of the whole trace duration
///
/// **Public** - scales layer portions into bar widths
///
/// # Returns
/// `node.duration / root.duration`; on a zero-length trace 1.0 for the
/// root and 0.0 for everything else
pub fn proportion(trace: &Trace, id: NodeId) -> Result<f64, AggregateError> {
    let duration = finished_duration(trace, id)?;
    share_of_root(trace, id, duration, trace.node(id).is_root())
}

/// `member` locates the root; `is_root` is true only for the root node itself
fn share_of_root(
    trace: &Trace,
    member: NodeId,
    duration: Duration,
    is_root: bool,
) -> Result<f64, AggregateError> {
    let total = finished_duration(trace, trace.root_of(member))?;

    if total.is_zero() {
        return Ok(if is_root { 1.0 } else { 0.0 });
    }
    Ok(duration.as_secs_f64() / total.as_secs_f64())
}

/// Check disparity and portions of every node, pre-order.
///
/// Returns the number of nodes checked.
pub fn verify_trace(trace: &Trace) -> Result<usize, AggregateError> {
    let walk = trace.walk();
    for &(id, _) in &walk {
        disparity(trace, id)?;
        layer_portions(trace, id)?;
    }
    Ok(walk.len())
}
