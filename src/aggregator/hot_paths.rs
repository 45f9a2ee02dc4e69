//! Hot paths over collapsed stacks.
//!
//! Hot paths are the step paths with the most self time.
//! These are the primary targets for optimization.

use super::stack_builder::CollapsedStack;
use crate::output::schema::HotPath;
use log::debug;

/// Calculate hot paths from collapsed stacks
///
/// **Public** - main entry point for hot path ranking
///
/// # Arguments
/// * `stacks` - Collapsed stacks from stack_builder, heaviest first
/// * `total_micros` - Total trace duration in microseconds
/// * `top_n` - Number of top paths to return (e.g., 10)
///
/// # Returns
/// Up to `top_n` hot paths with non-zero self time, heaviest first
pub fn calculate_hot_paths(stacks: &[CollapsedStack], total_micros: u64, top_n: usize) -> Vec<HotPath> {
    debug!("Calculating top {} hot paths from {} stacks", top_n, stacks.len());

    stacks
        .iter()
        .filter(|stack| stack.weight > 0)
        .take(top_n)
        .map(|stack| create_hot_path(stack, total_micros))
        .collect()
}

/// Create a HotPath from a CollapsedStack
pub fn create_hot_path(stack: &CollapsedStack, total_micros: u64) -> HotPath {
    let percentage = if total_micros > 0 {
        (stack.weight as f64 / total_micros as f64) * 100.0
    } else {
        0.0
    };

    HotPath {
        stack: stack.stack.clone(),
        micros: stack.weight,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_hot_paths() {
        let stacks = vec![
            CollapsedStack::new("request;Index".to_string(), 5000),
            CollapsedStack::new("request;Find".to_string(), 3000),
            CollapsedStack::new("request;Render".to_string(), 2000),
        ];

        let hot_paths = calculate_hot_paths(&stacks, 10000, 2);

        assert_eq!(hot_paths.len(), 2);
        assert_eq!(hot_paths[0].stack, "request;Index");
        assert_eq!(hot_paths[0].micros, 5000);
        assert_eq!(hot_paths[0].percentage, 50.0);
    }

    #[test]
    fn test_hot_paths_skip_empty_stacks() {
        let stacks = vec![
            CollapsedStack::new("request;Find".to_string(), 10),
            CollapsedStack::new("request".to_string(), 0),
        ];
        assert_eq!(calculate_hot_paths(&stacks, 10, 5).len(), 1);
    }

    #[test]
    fn test_create_hot_path_zero_total() {
        let stack = CollapsedStack::new("request".to_string(), 0);
        assert_eq!(create_hot_path(&stack, 0).percentage, 0.0);
    }
}
