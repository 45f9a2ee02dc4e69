//! Terminal text summary of a trace.
//!
//! Prints the step tree with times, share of the trace and a bar split
//! by layer. Below the root, each step with children is followed by its
//! `(Other)` entry.

use crate::aggregator::{
    bar_for_entry, children_with_disparity, find_unaccounted_steps, layer_portions, StepEntry,
};
use crate::trace::{Layer, NodeId, Trace};
use crate::utils::config::UNACCOUNTED_SHARE_THRESHOLD;
use crate::utils::error::AggregateError;

/// Summary rendering options
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Bar width in characters for a step spanning the whole trace
    pub width: usize,

    /// Deepest level to print (root is 0)
    pub max_depth: usize,

    /// Emit ANSI colors
    pub color: bool,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            width: 50,
            max_depth: 12,
            color: true,
        }
    }
}

const NAME_COLUMN: usize = 40;

fn ansi_color(layer: Layer) -> &'static str {
    match layer {
        Layer::Model => "\x1b[34m",      // Blue
        Layer::View => "\x1b[32m",       // Green
        Layer::Controller => "\x1b[33m", // Yellow
    }
}

const RESET: &str = "\x1b[0m";

/// Render the trace as a boxed tree with per-layer bars
///
/// **Public** - used by the demo and summary commands
///
/// # Arguments
/// * `trace` - Finished trace
/// * `config` - Width, depth and color options
///
/// # Returns
/// The table, a layer legend for the whole trace and, when present, the
/// steps whose time is mostly unaccounted for
pub fn generate_text_summary(trace: &Trace, config: &SummaryConfig) -> Result<String, AggregateError> {
    let mut lines = Vec::new();

    lines.push("  STEP BREAKDOWN".to_string());
    lines.push(format!("  ┏{}┳━━━━━━━━━━━━┳━━━━━━━━━┓", "━".repeat(NAME_COLUMN + 2)));
    lines.push(format!(
        "  ┃ {:<width$} ┃ {:^10} ┃ {:^7} ┃",
        "Step",
        "ms",
        "%",
        width = NAME_COLUMN
    ));
    lines.push(format!("  ┣{}╋━━━━━━━━━━━━╋━━━━━━━━━┫", "━".repeat(NAME_COLUMN + 2)));

    let root = trace.root();
    let root_entries: Vec<StepEntry> = trace
        .node(root)
        .children()
        .iter()
        .map(|&child| StepEntry::Recorded(child))
        .collect();

    let mut rows = Vec::new();
    push_row(trace, &StepEntry::Recorded(root), 0, config, &mut rows)?;
    for entry in &root_entries {
        push_subtree(trace, entry, 1, config, &mut rows)?;
    }
    lines.extend(rows);

    lines.push(format!("  ┗{}┻━━━━━━━━━━━━┻━━━━━━━━━┛", "━".repeat(NAME_COLUMN + 2)));
    lines.push(String::new());
    lines.push(legend(trace, root, config)?);

    let unaccounted = find_unaccounted_steps(trace, UNACCOUNTED_SHARE_THRESHOLD)?;
    if !unaccounted.is_empty() {
        lines.push(String::new());
        lines.push("  MOSTLY UNACCOUNTED (time outside child steps)".to_string());
        for step in &unaccounted {
            lines.push(format!(
                "  {:>10.1} ms  {:>5.1}%  {}",
                step.micros as f64 / 1000.0,
                step.share * 100.0,
                step.stack
            ));
        }
    }

    Ok(lines.join("\n"))
}

fn push_subtree(
    trace: &Trace,
    entry: &StepEntry,
    depth: usize,
    config: &SummaryConfig,
    rows: &mut Vec<String>,
) -> Result<(), AggregateError> {
    if depth > config.max_depth {
        return Ok(());
    }
    push_row(trace, entry, depth, config, rows)?;

    if let StepEntry::Recorded(id) = entry {
        for child in children_with_disparity(trace, *id)? {
            push_subtree(trace, &child, depth + 1, config, rows)?;
        }
    }
    Ok(())
}

fn push_row(
    trace: &Trace,
    entry: &StepEntry,
    depth: usize,
    config: &SummaryConfig,
    rows: &mut Vec<String>,
) -> Result<(), AggregateError> {
    let millis = entry.duration(trace)?.as_secs_f64() * 1000.0;
    let percentage = entry.proportion(trace)? * 100.0;

    let label = format!("{}{}", "  ".repeat(depth), entry.name(trace));
    let label = truncate(&label, NAME_COLUMN);

    rows.push(format!(
        "  ┃ {:<width$} ┃ {:>10.1} ┃ {:>6.1}% ┃ {}",
        label,
        millis,
        percentage,
        render_bar(trace, entry, config)?,
        width = NAME_COLUMN
    ));
    Ok(())
}

fn render_bar(trace: &Trace, entry: &StepEntry, config: &SummaryConfig) -> Result<String, AggregateError> {
    let mut bar = String::new();
    for segment in bar_for_entry(trace, entry, config.width as f64)? {
        let cells = segment.width.round() as usize;
        if cells == 0 {
            continue;
        }
        if config.color {
            bar.push_str(ansi_color(segment.layer));
            bar.push_str(&"█".repeat(cells));
            bar.push_str(RESET);
        } else {
            bar.push_str(&segment.layer.initial().to_string().repeat(cells));
        }
    }
    Ok(bar)
}

fn legend(trace: &Trace, root: NodeId, config: &SummaryConfig) -> Result<String, AggregateError> {
    let portions = layer_portions(trace, root)?;
    let parts: Vec<String> = portions
        .iter()
        .map(|(layer, portion)| {
            let name = format!("{} {:.1}%", capitalize(layer.as_str()), portion * 100.0);
            if config.color {
                format!("{}█{} {}", ansi_color(layer), RESET, name)
            } else {
                format!("{} {}", layer.initial(), name)
            }
        })
        .collect();
    Ok(format!("  {}", parts.join("   ")))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        return label.to_string();
    }
    let kept: String = label.chars().take(max - 3).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Step, TraceBuilder};
    use std::time::Duration;

    fn plain() -> SummaryConfig {
        SummaryConfig {
            width: 20,
            max_depth: 12,
            color: false,
        }
    }

    fn sample() -> Trace {
        let mut builder = TraceBuilder::new(Duration::from_millis(100));
        let root = builder.root();
        let find = builder.push(root, Step::model("Find users"), Duration::from_millis(50));
        builder.push(find, Step::view("Render row"), Duration::from_millis(25));
        builder.finish()
    }

    #[test]
    fn test_summary_lists_steps_and_other() {
        let summary = generate_text_summary(&sample(), &plain()).unwrap();

        assert!(summary.contains("request"));
        assert!(summary.contains("  Find users"));
        assert!(summary.contains("    Render row"));
        assert!(summary.contains("(Other)"));
        assert!(summary.contains("Controller 50.0%"));
        // Find users spends 25 of its 50ms outside Render row
        assert!(summary.contains("MOSTLY UNACCOUNTED"));
        assert!(summary.contains("request;Find users"));
    }

    #[test]
    fn test_plain_bar_uses_initials() {
        let summary = generate_text_summary(&sample(), &plain()).unwrap();
        // Find users: half model, half view, half the trace => 5 + 5 cells
        assert!(summary.contains("MMMMMVVVVV"));
        assert!(!summary.contains("\x1b["));
    }

    #[test]
    fn test_max_depth_limits_rows() {
        let config = SummaryConfig {
            max_depth: 1,
            ..plain()
        };
        let summary = generate_text_summary(&sample(), &config).unwrap();
        assert!(!summary.contains("Render row"));
    }

    #[test]
    fn test_truncate_long_names() {
        let long = "x".repeat(60);
        let cut = truncate(&long, 40);
        assert_eq!(cut.chars().count(), 40);
        assert!(cut.ends_with("..."));
    }
}
