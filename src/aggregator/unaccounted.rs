//! Steps whose time is mostly unaccounted for.
//!
//! A step with children whose `(Other)` entry dominates spends most of its
//! time in code that no child step covers. Those are the places where more
//! instrumentation pays off.

use super::metrics::{disparity, finished_duration};
use super::stack_builder::stack_key;
use crate::output::schema::UnaccountedStep;
use crate::trace::Trace;
use crate::utils::error::AggregateError;
use log::debug;

/// Find steps whose disparity is at least `min_share` of their duration
///
/// **Public** - used by profile export, the text summary and the demo report
///
/// # Arguments
/// * `trace` - Finished trace
/// * `min_share` - Fraction of a step's own time, in [0, 1]
///
/// # Returns
/// Matching steps below the root, most unaccounted time first. Childless
/// and zero-length steps never match.
///
/// # Errors
/// Same as [`disparity`]
pub fn find_unaccounted_steps(trace: &Trace, min_share: f64) -> Result<Vec<UnaccountedStep>, AggregateError> {
    let mut steps = Vec::new();

    for (id, _) in trace.walk() {
        let node = trace.node(id);
        if node.is_root() || node.children().is_empty() {
            continue;
        }

        let duration = finished_duration(trace, id)?;
        let unaccounted = disparity(trace, id)?;
        if duration.is_zero() || unaccounted.is_zero() {
            continue;
        }

        let share = unaccounted.as_secs_f64() / duration.as_secs_f64();
        if share >= min_share {
            steps.push(UnaccountedStep {
                stack: stack_key(trace, id),
                micros: unaccounted.as_micros() as u64,
                share,
            });
        }
    }

    steps.sort_by(|a, b| b.micros.cmp(&a.micros).then_with(|| a.stack.cmp(&b.stack)));
    debug!("Found {} mostly unaccounted steps", steps.len());

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{Step, TraceBuilder};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_flags_steps_dominated_by_other() {
        let mut builder = TraceBuilder::new(ms(100));
        let root = builder.root();
        let index = builder.push(root, Step::controller("Index"), ms(80));
        builder.push(index, Step::model("Find"), ms(20));
        let render = builder.push(root, Step::view("Render"), ms(20));
        builder.push(render, Step::view("Partial"), ms(18));
        let trace = builder.finish();

        let steps = find_unaccounted_steps(&trace, 0.5).unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].stack, "request;Index");
        assert_eq!(steps[0].micros, 60_000);
        assert!((steps[0].share - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_skips_root_leaves_and_zero_length_steps() {
        let mut builder = TraceBuilder::new(ms(50));
        let root = builder.root();
        builder.push(root, Step::model("Leaf"), ms(10));
        let empty = builder.push(root, Step::model("Empty"), Duration::ZERO);
        builder.push(empty, Step::model("Instant"), Duration::ZERO);
        let trace = builder.finish();

        assert!(find_unaccounted_steps(&trace, 0.0).unwrap().is_empty());
    }

    #[test]
    fn test_overrun_is_reported() {
        let mut builder = TraceBuilder::new(ms(50));
        let root = builder.root();
        let parent = builder.push(root, Step::model("Parent"), ms(5));
        builder.push(parent, Step::model("Child"), ms(6));
        let trace = builder.finish();

        assert!(matches!(
            find_unaccounted_steps(&trace, 0.5),
            Err(AggregateError::Calculation(_))
        ));
    }
}
