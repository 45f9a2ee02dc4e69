//! Demo command implementation.
//!
//! The demo command:
//! 1. Records a simulated MVC request through the thread-local recorder
//! 2. Aggregates the trace into a versioned profile
//! 3. Builds collapsed stacks
//! 4. Writes output files and an optional text summary

use super::models::DemoArgs;
use crate::aggregator::{build_collapsed_stacks, collapsed_text};
use crate::output::{generate_text_summary, to_profile, write_profile, write_text, SummaryConfig};
use crate::recorder::ambient;
use crate::trace::{Step, Trace};
use crate::utils::config::AggregationConfig;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::thread;
use std::time::{Duration, Instant};

/// Label stored in the demo profile
pub const DEMO_LABEL: &str = "GET /users";

/// Execute the demo command
///
/// **Public** - called from main.rs
///
/// # Arguments
/// * `args` - Output paths, scale and summary options
///
/// # Errors
/// * Aggregation errors in the recorded trace
/// * File write errors
pub fn execute_demo(args: DemoArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/4: Recording simulated request {}...", DEMO_LABEL);
    let trace = simulate_request(&args);
    debug!("Recorded {} steps", trace.len() - 1);

    info!("Step 2/4: Aggregating trace...");
    let profile = to_profile(&trace, DEMO_LABEL, args.top_paths).context("Failed to aggregate trace")?;
    for step in &profile.unaccounted {
        warn!(
            "{:.1}% of {} is outside its child steps ({:.1} ms)",
            step.share * 100.0,
            step.stack,
            step.micros as f64 / 1000.0
        );
    }

    info!("Step 3/4: Building collapsed stacks...");
    let stacks = build_collapsed_stacks(&trace).context("Failed to build collapsed stacks")?;
    debug!("Built {} collapsed stacks", stacks.len());

    info!("Step 4/4: Writing output files...");
    write_profile(&profile, &args.output_json).context("Failed to write profile JSON")?;
    info!("✓ Profile written to: {}", args.output_json.display());

    if let Some(path) = &args.output_collapsed {
        write_text(&collapsed_text(&stacks), path).context("Failed to write collapsed stacks")?;
        info!("✓ Collapsed stacks written to: {}", path.display());
    }

    if args.print_summary {
        let config = SummaryConfig {
            width: args.width,
            ..SummaryConfig::default()
        };
        println!("\n{}", "=".repeat(80));
        println!("PROFILE SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Request:     {}", DEMO_LABEL);
        println!("Total Time:  {:.1} ms", profile.total_ms);
        println!("Steps:       {}", trace.len() - 1);
        println!("\n{}", generate_text_summary(&trace, &config)?);
        println!("{}", "=".repeat(80));
    }

    info!("Demo completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

/// Record a request shaped like a typical list page
pub fn simulate_request(args: &DemoArgs) -> Trace {
    let scale = args.scale;
    let work = |millis: f64| thread::sleep(Duration::from_secs_f64(millis * scale / 1000.0));

    let (trace, ()) = ambient::record_with(AggregationConfig::new(args.unclassified), || {
        ambient::step(Step::container("Before filters"), || {
            ambient::step(Step::controller("Authenticate"), || {
                work(1.0);
                ambient::step(
                    Step::model("Session Load").with_extra("sql", "SELECT * FROM sessions WHERE id = ?"),
                    || work(2.0),
                );
            });
        });

        ambient::step(Step::controller("UsersController#index"), || {
            work(1.0);
            ambient::step(
                Step::model("User Load").with_extra("sql", "SELECT * FROM users LIMIT 25"),
                || work(6.0),
            );
            ambient::step(
                Step::model("User Count").with_extra("sql", "SELECT COUNT(*) FROM users"),
                || work(2.0),
            );
        });

        ambient::step(Step::view("Render users/index").with_extra("template", "users/index"), || {
            work(2.0);
            for i in 0..3 {
                ambient::step(Step::view("Render users/_user"), || {
                    work(1.0);
                    if i == 0 {
                        ambient::step(Step::model("Avatar Load"), || work(1.5));
                    }
                });
            }
            ambient::step(Step::view("Render layouts/application"), || work(1.5));
        });
    });

    trace
}

/// Validate demo arguments
pub fn validate_args(args: &DemoArgs) -> Result<()> {
    if !args.scale.is_finite() || args.scale < 0.0 {
        anyhow::bail!("scale must be a non-negative number");
    }

    if args.scale > 100.0 {
        anyhow::bail!("scale is too large (max 100)");
    }

    if args.top_paths == 0 {
        anyhow::bail!("top_paths must be greater than 0");
    }

    if args.top_paths > 1000 {
        anyhow::bail!("top_paths is too large (max 1000)");
    }

    if args.width == 0 || args.width > 500 {
        anyhow::bail!("width must be between 1 and 500");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::verify_trace;
    use crate::output::read_profile;

    fn fast() -> DemoArgs {
        DemoArgs {
            scale: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_args_valid() {
        assert!(validate_args(&DemoArgs::default()).is_ok());
    }

    #[test]
    fn test_validate_args_bad_scale() {
        for scale in [-1.0, f64::NAN, 1000.0] {
            let args = DemoArgs {
                scale,
                ..Default::default()
            };
            assert!(validate_args(&args).is_err(), "scale {} accepted", scale);
        }
    }

    #[test]
    fn test_validate_args_top_paths() {
        let zero = DemoArgs {
            top_paths: 0,
            ..Default::default()
        };
        let huge = DemoArgs {
            top_paths: 2000,
            ..Default::default()
        };
        assert!(validate_args(&zero).is_err());
        assert!(validate_args(&huge).is_err());
    }

    #[test]
    fn test_validate_args_width() {
        let args = DemoArgs {
            width: 0,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_simulated_request_shape() {
        let trace = simulate_request(&fast());

        let top: Vec<&str> = trace
            .node(trace.root())
            .children()
            .iter()
            .map(|&id| trace.node(id).display_name())
            .collect();
        assert_eq!(
            top,
            vec!["Before filters", "UsersController#index", "Render users/index"]
        );
        assert_eq!(verify_trace(&trace).unwrap(), trace.len());
    }

    #[test]
    fn test_execute_demo_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let args = DemoArgs {
            output_json: dir.path().join("profile.json"),
            output_collapsed: Some(dir.path().join("stacks.txt")),
            ..fast()
        };

        execute_demo(args.clone()).unwrap();

        let profile = read_profile(&args.output_json).unwrap();
        assert_eq!(profile.label, DEMO_LABEL);
        assert_eq!(profile.root.children.len(), 3);

        let stacks = std::fs::read_to_string(dir.path().join("stacks.txt")).unwrap();
        assert!(stacks.contains("request;UsersController#index;User Load "));
    }
}
