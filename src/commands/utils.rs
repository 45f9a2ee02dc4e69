use crate::aggregator::{find_unaccounted_steps, verify_trace};
use crate::output::{generate_text_summary, import_profile, read_profile, SummaryConfig};
use crate::utils::config::{AggregationConfig, SCHEMA_VERSION, UNACCOUNTED_SHARE_THRESHOLD};
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a profile JSON file
///
/// **Public** - entry point of the validate command
///
/// # Arguments
/// * `file_path` - Profile JSON to check
/// * `config` - Aggregation settings for the rebuilt trace
///
/// # Errors
/// Unreadable files, malformed JSON, and any step whose children
/// overrun it
pub fn validate_profile_file(file_path: &Path, config: AggregationConfig) -> Result<()> {
    println!("Validating profile: {}", file_path.display());

    let profile = read_profile(file_path)?;
    let trace = import_profile(&profile, config).context("Failed to rebuild trace")?;
    let checked = verify_trace(&trace).context("Profile timings are inconsistent")?;
    let unaccounted = find_unaccounted_steps(&trace, UNACCOUNTED_SHARE_THRESHOLD)?;

    println!("✓ Valid profile JSON");
    println!("  Version: {}", profile.version);
    println!("  Label: {}", profile.label);
    println!("  Total Time: {:.1} ms", profile.total_ms);
    println!("  Steps Checked: {}", checked);
    println!("  Hot Paths: {}", profile.hot_paths.len());
    println!("  Mostly Unaccounted Steps: {}", unaccounted.len());

    Ok(())
}

/// Print the step tree of a profile JSON file
pub fn print_profile_summary(file_path: &Path, config: AggregationConfig, summary: &SummaryConfig) -> Result<()> {
    let profile = read_profile(file_path)?;
    let trace = import_profile(&profile, config).context("Failed to rebuild trace")?;

    println!("Profile: {} ({})", profile.label, profile.generated_at);
    println!("{}", generate_text_summary(&trace, summary)?);

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("TuneUp Profile Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  label: string            - What was profiled");
        println!("  total_ms: number         - Total trace time");
        println!("  layer_portions: object   - model/view/controller fractions");
        println!("  hot_paths: array         - Paths with the most self time");
        println!("    stack: string          - Semicolon-separated step names");
        println!("    micros: number         - Self time");
        println!("    percentage: number     - Percentage of total time");
        println!("  unaccounted: array       - Steps mostly outside their child steps");
        println!("    stack: string          - Semicolon-separated step names");
        println!("    micros: number         - Time in the (Other) entry");
        println!("    share: number          - Fraction of the step's own time");
        println!("  root: step               - Step tree");
        println!("    name: string?          - Omitted on the root");
        println!("    layer: string?         - model | view | controller");
        println!("    extras: object?        - Free-form annotations");
        println!("    time: number           - Seconds");
        println!("    synthetic: bool?       - True on (Other) entries");
        println!("    children: array        - Steps in start order");
        println!("  generated_at: string     - RFC 3339 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("TuneUp v{}", env!("CARGO_PKG_VERSION"));
    println!("Profile Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("An in-process step profiler with model/view/controller breakdowns.");
}
