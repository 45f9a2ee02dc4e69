//! Finished trace trees.

use super::node::{Node, NodeId, Step};
use crate::utils::config::AggregationConfig;
use std::time::Duration;

/// A recorded trace: an arena of nodes rooted at [`NodeId::ROOT`].
///
/// Node ids are only meaningful for the trace that produced them;
/// [`Trace::node`] panics on an id from another trace.
#[derive(Debug, Clone)]
pub struct Trace {
    nodes: Vec<Node>,
    config: AggregationConfig,
}

impl Trace {
    pub(crate) fn from_nodes(nodes: Vec<Node>, config: AggregationConfig) -> Self {
        debug_assert!(nodes.first().map_or(false, Node::is_root));
        Self { nodes, config }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Total duration of the trace, if the root has finished
    pub fn duration(&self) -> Option<Duration> {
        self.node(NodeId::ROOT).duration()
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the root is always present
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first, pre-order walk as `(id, depth)` with the root at depth 0.
    ///
    /// Siblings are visited in start order.
    pub fn walk(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut pending = vec![(NodeId::ROOT, 0)];

        while let Some((id, depth)) = pending.pop() {
            out.push((id, depth));
            for &child in self.node(id).children().iter().rev() {
                pending.push((child, depth + 1));
            }
        }

        out
    }

    /// Follow parent links up to the node with no parent
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.node(current).parent() {
            current = parent;
        }
        current
    }

    /// Display names from the root down to `id`, inclusive
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id);
            names.push(node.display_name());
            current = node.parent();
        }
        names.reverse();
        names
    }
}

/// Assembles a finished trace from explicit durations.
///
/// Used when importing exported profiles and for deterministic tests.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tuneup_core::trace::{Step, TraceBuilder};
///
/// let mut builder = TraceBuilder::new(Duration::from_millis(100));
/// let root = builder.root();
/// let find = builder.push(root, Step::model("Find users"), Duration::from_millis(30));
/// builder.push(find, Step::view("Render row"), Duration::from_millis(10));
/// let trace = builder.finish();
/// assert_eq!(trace.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct TraceBuilder {
    nodes: Vec<Node>,
    config: AggregationConfig,
}

impl TraceBuilder {
    pub fn new(root_duration: Duration) -> Self {
        let mut root = Node::root();
        root.duration = Some(root_duration);
        Self {
            nodes: vec![root],
            config: AggregationConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AggregationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Append a finished step as the last child of `parent`
    ///
    /// **Public** - used by profile import and tests
    ///
    /// # Returns
    /// Id of the new node
    pub fn push(&mut self, parent: NodeId, step: Step, duration: Duration) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = Node::from_step(step, parent);
        node.duration = Some(duration);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn finish(self) -> Trace {
        Trace::from_nodes(self.nodes, self.config)
    }
}
