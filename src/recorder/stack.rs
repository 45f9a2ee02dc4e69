//! The recording stack: turns nested step calls into a trace tree.
//!
//! A [`Recorder`] owns an arena of nodes plus a LIFO of the nodes that are
//! currently open. Starting a step attaches it to whatever is on top of the
//! stack and pushes it; finishing it stamps the elapsed time and pops it.
//! Finishing happens in [`StepGuard`]'s `Drop`, so a panicking body still
//! leaves the stack consistent for its siblings and ancestors.

use crate::trace::{Node, NodeId, Step, Trace};
use crate::utils::config::AggregationConfig;
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct RecordingStack {
    nodes: Vec<Node>,
    open: Vec<NodeId>,
    generation: u64,
    config: AggregationConfig,
}

impl RecordingStack {
    fn new(config: AggregationConfig) -> Self {
        Self {
            nodes: vec![Node::root()],
            open: Vec::new(),
            generation: 0,
            config,
        }
    }

    fn reset(&mut self) {
        if !self.open.is_empty() {
            debug!("Discarding {} open steps on reset", self.open.len());
        }
        self.nodes = vec![Node::root()];
        self.open.clear();
        self.generation += 1;
    }

    fn open_root(&mut self) -> NodeId {
        self.open.push(NodeId::ROOT);
        NodeId::ROOT
    }

    /// Attach `step` under the current top and push it
    fn open_step(&mut self, step: Step) -> Option<NodeId> {
        let parent = *self.open.last()?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::from_step(step, parent));
        self.nodes[parent.0].children.push(id);
        self.open.push(id);
        Some(id)
    }

    fn close(&mut self, id: NodeId, elapsed: Duration) {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        if node.duration.is_some() {
            warn!("Step '{}' closed twice; keeping first duration", node.display_name());
            return;
        }
        node.duration = Some(elapsed);

        match self.open.iter().rposition(|&open| open == id) {
            Some(pos) => {
                let leaked = self.open.len() - pos - 1;
                if leaked > 0 {
                    warn!(
                        "Step '{}' finished with {} nested steps still open",
                        self.nodes[id.0].display_name(),
                        leaked
                    );
                }
                self.open.truncate(pos);
            }
            None => warn!("Step {} was not on the recording stack", id),
        }
    }

    fn take_trace(&mut self) -> Trace {
        let nodes = std::mem::replace(&mut self.nodes, vec![Node::root()]);
        self.open.clear();
        self.generation += 1;
        Trace::from_nodes(nodes, self.config)
    }
}

/// Handle to a recording stack.
///
/// Cloning is cheap and every clone records into the same trace. The handle
/// is `!Send`: each thread or request gets its own recorder.
///
/// # Example
/// ```
/// use tuneup_core::recorder::Recorder;
/// use tuneup_core::trace::Step;
///
/// let recorder = Recorder::new();
/// let (trace, rows) = recorder.record(|rec| {
///     rec.step(Step::model("Find users"), |_| vec!["ada", "grace"])
/// });
/// assert_eq!(rows.len(), 2);
/// assert_eq!(trace.node(trace.root()).children().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Recorder {
    state: Rc<RefCell<RecordingStack>>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self::with_config(AggregationConfig::default())
    }

    pub fn with_config(config: AggregationConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(RecordingStack::new(config))),
        }
    }

    /// Clear the stack and discard any partially recorded tree.
    ///
    /// Guards opened before the reset become inert.
    pub fn reset(&self) {
        self.state.borrow_mut().reset();
    }

    /// Number of currently open steps, root included
    pub fn depth(&self) -> usize {
        self.state.borrow().open.len()
    }

    pub fn is_recording(&self) -> bool {
        self.depth() > 0
    }

    /// Record a whole trace.
    ///
    /// **Public** - main entry point for recording
    ///
    /// # Arguments
    /// * `body` - The unit of work; receives this recorder for nested steps
    ///
    /// # Returns
    /// The finished tree together with whatever `body` returned
    ///
    /// Resets the stack first. Calling this while a trace is already being
    /// recorded on the same recorder discards the outer trace.
    pub fn record<T>(&self, body: impl FnOnce(&Recorder) -> T) -> (Trace, T) {
        if self.is_recording() {
            warn!("Starting a new trace while another is being recorded; discarding it");
        }

        let value = {
            let root = {
                let mut state = self.state.borrow_mut();
                state.reset();
                let id = state.open_root();
                StepGuard::new(self.clone(), Some(id), state.generation)
            };
            let value = body(self);
            drop(root);
            value
        };

        let trace = self.state.borrow_mut().take_trace();
        debug!(
            "Recorded trace with {} steps in {:?}",
            trace.len() - 1,
            trace.duration().unwrap_or_default()
        );
        (trace, value)
    }

    /// Time `body` as a child of the currently open step.
    ///
    /// **Public** - used by instrumented code for every nested step
    ///
    /// # Arguments
    /// * `step` - Name, layer and extras of the step
    /// * `body` - Work to time
    ///
    /// # Returns
    /// The body's value unchanged, including any `Err`. With no open step
    /// the body runs untracked.
    pub fn step<T>(&self, step: Step, body: impl FnOnce(&Recorder) -> T) -> T {
        let _guard = self.enter(step);
        body(self)
    }

    /// Open a step that finishes when the returned guard is dropped
    pub fn enter(&self, step: Step) -> StepGuard {
        let mut state = self.state.borrow_mut();
        let name = step.name.clone();
        let id = state.open_step(step);
        if id.is_none() {
            debug!("No trace is being recorded; running '{}' untracked", name);
        }
        StepGuard::new(self.clone(), id, state.generation)
    }

    fn finish(&self, id: NodeId, generation: u64, elapsed: Duration) {
        let Ok(mut state) = self.state.try_borrow_mut() else {
            warn!("Recording stack busy; dropping timing for step {}", id);
            return;
        };
        if state.generation != generation {
            debug!("Ignoring step {} from a reset trace", id);
            return;
        }
        state.close(id, elapsed);
    }
}

/// Open step; stamps its duration and pops it when dropped
#[must_use = "the step finishes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct StepGuard {
    recorder: Recorder,
    id: Option<NodeId>,
    generation: u64,
    started: Instant,
}

impl StepGuard {
    fn new(recorder: Recorder, id: Option<NodeId>, generation: u64) -> Self {
        Self {
            recorder,
            id,
            generation,
            started: Instant::now(),
        }
    }

    /// Arena id of the step, `None` when running untracked
    pub fn id(&self) -> Option<NodeId> {
        self.id
    }
}

impl Drop for StepGuard {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            self.recorder
                .finish(id, self.generation, self.started.elapsed());
        }
    }
}
