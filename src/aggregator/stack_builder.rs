//! Build collapsed stack format from a finished trace.
//!
//! Collapsed stacks are the input format of external flamegraph tools.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "request;Index;Find users 30000"
//! This means: the request ran Index, which ran Find users, spending
//! 30000 microseconds directly in Find users.

use super::metrics::{disparity, finished_duration};
use crate::trace::{NodeId, Trace};
use crate::utils::error::AggregateError;
use log::debug;
use std::collections::HashMap;

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Self time of this stack in microseconds
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Render as one line of collapsed-stack text
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from a trace
///
/// **Public** - main entry point for stack building
///
/// # Arguments
/// * `trace` - Finished trace
///
/// # Returns
/// Vector of collapsed stacks, one per unique step path, heaviest first
///
/// # Algorithm
/// 1. Walk every node
/// 2. Take its self time: full duration for leaves, disparity otherwise
/// 3. Key it by the path of step names from the root
/// 4. Aggregate by unique stack (sum weights), heaviest first
pub fn build_collapsed_stacks(trace: &Trace) -> Result<Vec<CollapsedStack>, AggregateError> {
    debug!("Building collapsed stacks from {} steps", trace.len());

    let mut stack_map: HashMap<String, u64> = HashMap::new();

    for (id, _) in trace.walk() {
        let self_time = if trace.node(id).children().is_empty() {
            finished_duration(trace, id)?
        } else {
            disparity(trace, id)?
        };

        *stack_map.entry(stack_key(trace, id)).or_insert(0) += self_time.as_micros() as u64;
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();

    // Ties broken by name so output is stable
    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} unique collapsed stacks", stacks.len());

    Ok(stacks)
}

/// Render stacks as collapsed-stack text, one per line
pub fn collapsed_text(stacks: &[CollapsedStack]) -> String {
    stacks
        .iter()
        .map(CollapsedStack::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `;`-joined frame names from the root down to `id`
pub(crate) fn stack_key(trace: &Trace, id: NodeId) -> String {
    trace
        .path(id)
        .into_iter()
        .map(frame_name)
        .collect::<Vec<_>>()
        .join(";")
}

/// Frame separators and line breaks would corrupt the format
fn frame_name(name: &str) -> String {
    name.replace([';', '\n'], " ")
}
