//! Conversion between traces and their exported, tree-shaped form.

use super::schema::{Profile, StepExport};
use crate::aggregator::{
    build_collapsed_stacks, calculate_hot_paths, children_with_disparity, find_unaccounted_steps,
    layer_portions, proportion, StepEntry,
};
use crate::trace::{NodeId, Step, Trace, TraceBuilder};
use crate::utils::config::{
    AggregationConfig, OTHER_STEP_NAME, SCHEMA_VERSION, UNACCOUNTED_SHARE_THRESHOLD,
};
use crate::utils::error::{AggregateError, ParseError};
use log::debug;
use std::collections::BTreeMap;
use std::time::Duration;

/// Export the whole tree, root first.
///
/// **Public** - main entry point for the tree-shaped export
///
/// # Returns
/// The root without name or layer, listing its raw children. Every other
/// node lists `children_with_disparity` so the `(Other)` share is visible.
///
/// # Errors
/// Any aggregation error of any node
pub fn export_tree(trace: &Trace) -> Result<StepExport, AggregateError> {
    let root = trace.root();
    let children = trace
        .node(root)
        .children()
        .iter()
        .map(|&child| export_step(trace, child))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StepExport {
        name: None,
        layer: None,
        extras: BTreeMap::new(),
        time: finished_secs(trace, root)?,
        synthetic: false,
        layer_portions: Some(layer_portions(trace, root)?),
        proportion: Some(proportion(trace, root)?),
        children,
    })
}

fn export_step(trace: &Trace, id: NodeId) -> Result<StepExport, AggregateError> {
    let node = trace.node(id);
    let children = children_with_disparity(trace, id)?
        .iter()
        .map(|entry| export_entry(trace, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StepExport {
        name: node.name().map(str::to_string),
        layer: node.layer(),
        extras: node.extras().clone(),
        time: finished_secs(trace, id)?,
        synthetic: false,
        layer_portions: Some(layer_portions(trace, id)?),
        proportion: Some(proportion(trace, id)?),
        children,
    })
}

fn export_entry(trace: &Trace, entry: &StepEntry) -> Result<StepExport, AggregateError> {
    match entry {
        StepEntry::Recorded(id) => export_step(trace, *id),
        StepEntry::Other(other) => Ok(StepExport {
            name: Some(OTHER_STEP_NAME.to_string()),
            layer: other.layer,
            extras: BTreeMap::new(),
            time: other.duration.as_secs_f64(),
            synthetic: true,
            layer_portions: Some(entry.layer_portions(trace)?),
            proportion: Some(entry.proportion(trace)?),
            children: Vec::new(),
        }),
    }
}

fn finished_secs(trace: &Trace, id: NodeId) -> Result<f64, AggregateError> {
    crate::aggregator::finished_duration(trace, id).map(|d| d.as_secs_f64())
}

/// Build a versioned profile from a finished trace
///
/// **Public** - used by commands to create final output
///
/// # Arguments
/// * `trace` - Finished trace
/// * `label` - What was profiled (e.g. "GET /users")
/// * `top_paths` - Number of hot paths to include
///
/// # Returns
/// Profile with the exported tree, hot paths and mostly unaccounted steps
///
/// # Errors
/// Any aggregation error found while exporting the tree
pub fn to_profile(trace: &Trace, label: &str, top_paths: usize) -> Result<Profile, AggregateError> {
    let root = export_tree(trace)?;
    let total = crate::aggregator::finished_duration(trace, trace.root())?;
    let stacks = build_collapsed_stacks(trace)?;

    Ok(Profile {
        version: SCHEMA_VERSION.to_string(),
        label: label.to_string(),
        total_ms: total.as_secs_f64() * 1000.0,
        layer_portions: layer_portions(trace, trace.root())?,
        hot_paths: calculate_hot_paths(&stacks, total.as_micros() as u64, top_paths),
        unaccounted: find_unaccounted_steps(trace, UNACCOUNTED_SHARE_THRESHOLD)?,
        root,
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Rebuild a finished trace from its exported form.
///
/// **Public** - used by the summary and validate commands
///
/// # Arguments
/// * `root` - Exported root step
/// * `config` - Aggregation settings for the rebuilt trace
///
/// # Returns
/// A finished trace. Synthetic `(Other)` entries are dropped; they are
/// derived, not recorded.
///
/// # Errors
/// * `ParseError::InvalidFormat` - a time is negative, not finite, or the
///   root carries a name
pub fn import_tree(root: &StepExport, config: AggregationConfig) -> Result<Trace, ParseError> {
    if root.name.is_some() || root.synthetic {
        return Err(ParseError::InvalidFormat(
            "Root step must not have a name".to_string(),
        ));
    }

    let mut builder = TraceBuilder::new(parse_time(root.time, "root")?).with_config(config);
    let mut pending: Vec<(NodeId, &StepExport)> = vec![(builder.root(), root)];

    while let Some((parent, export)) = pending.pop() {
        for child in export.children.iter().filter(|child| !child.synthetic) {
            let name = child.name.clone().ok_or_else(|| {
                ParseError::InvalidFormat("Non-root step without a name".to_string())
            })?;
            let time = parse_time(child.time, &name)?;
            let step = Step {
                name,
                layer: child.layer,
                extras: child.extras.clone(),
            };
            let id = builder.push(parent, step, time);
            pending.push((id, child));
        }
    }

    let trace = builder.finish();
    debug!("Imported trace with {} steps", trace.len());
    Ok(trace)
}

/// Rebuild the trace stored in a profile
pub fn import_profile(profile: &Profile, config: AggregationConfig) -> Result<Trace, ParseError> {
    if profile.version != SCHEMA_VERSION {
        debug!(
            "Profile schema {} differs from current {}",
            profile.version, SCHEMA_VERSION
        );
    }
    import_tree(&profile.root, config)
}

fn parse_time(seconds: f64, step: &str) -> Result<Duration, ParseError> {
    Duration::try_from_secs_f64(seconds).map_err(|e| {
        ParseError::InvalidFormat(format!("Invalid time {} for step '{}': {}", seconds, step, e))
    })
}
