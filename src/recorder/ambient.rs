//! Thread-local front end to the recorder.
//!
//! Instrumented code deep inside a request rarely has a [`Recorder`] handle
//! at hand. [`record`] binds a fresh recorder to the current thread for the
//! duration of one trace and [`step`] records into whichever recorder is
//! bound. Each thread has its own binding, so concurrent requests on
//! different threads never see each other's steps.

use super::stack::Recorder;
use crate::trace::{Step, Trace};
use crate::utils::config::AggregationConfig;
use log::debug;
use std::cell::RefCell;

thread_local! {
    static ACTIVE: RefCell<Option<Recorder>> = const { RefCell::new(None) };
}

/// Restores the previous binding when a trace ends, even by panic
struct Binding {
    previous: Option<Recorder>,
}

impl Binding {
    fn bind(recorder: Recorder) -> Self {
        let previous = ACTIVE.with(|active| active.replace(Some(recorder)));
        Self { previous }
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE.with(|active| *active.borrow_mut() = previous);
    }
}

fn current() -> Option<Recorder> {
    ACTIVE.with(|active| active.borrow().clone())
}

/// Record `body` as a new trace on this thread
///
/// **Public** - main entry point of the thread-local API
pub fn record<T>(body: impl FnOnce() -> T) -> (Trace, T) {
    record_with(AggregationConfig::default(), body)
}

/// Record `body` as a new trace using the given aggregation settings
pub fn record_with<T>(config: AggregationConfig, body: impl FnOnce() -> T) -> (Trace, T) {
    let recorder = Recorder::with_config(config);
    let _binding = Binding::bind(recorder.clone());
    recorder.record(|_| body())
}

/// Time `body` as a step of the trace bound to this thread.
///
/// **Public** - used by instrumented code without a recorder handle
///
/// # Returns
/// Whatever `body` returned. Runs `body` untracked when no trace is
/// being recorded.
pub fn step<T>(step: Step, body: impl FnOnce() -> T) -> T {
    match current() {
        Some(recorder) => recorder.step(step, |_| body()),
        None => {
            debug!("No active trace on this thread; running '{}' untracked", step.name);
            body()
        }
    }
}

/// Clear the stack of the trace bound to this thread, if any
pub fn reset() {
    if let Some(recorder) = current() {
        recorder.reset();
    }
}

/// Whether a trace is being recorded on this thread
pub fn is_active() -> bool {
    current().map_or(false, |recorder| recorder.is_recording())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambient_record_and_step() {
        let (trace, value) = record(|| {
            step(Step::controller("Index"), || {
                step(Step::model("Find"), || 2) + step(Step::view("Render"), || 3)
            })
        });

        assert_eq!(value, 5);
        let action = trace.node(trace.root()).children()[0];
        let children: Vec<&str> = trace
            .node(action)
            .children()
            .iter()
            .map(|&id| trace.node(id).display_name())
            .collect();
        assert_eq!(children, vec!["Find", "Render"]);
    }

    #[test]
    fn test_binding_released_after_record() {
        record(|| assert!(is_active()));
        assert!(!is_active());
        assert_eq!(step(Step::model("Stray"), || 1), 1);
    }

    #[test]
    fn test_nested_record_restores_outer() {
        let (outer, inner_len) = record(|| {
            step(Step::model("Before"), || ());
            let (inner, _) = record(|| step(Step::view("Inner"), || ()));
            step(Step::model("After"), || ());
            inner.len()
        });

        assert_eq!(inner_len, 2);
        let names: Vec<&str> = outer
            .node(outer.root())
            .children()
            .iter()
            .map(|&id| outer.node(id).display_name())
            .collect();
        assert_eq!(names, vec!["Before", "After"]);
    }
}
