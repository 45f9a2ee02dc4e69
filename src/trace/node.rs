//! Step descriptors and arena nodes.

use super::layer::{Layer, LayerPortions};
use crate::utils::config::ROOT_FRAME_NAME;
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Index of a node inside its trace's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root always occupies the first arena slot
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the caller knows about a step before it runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub layer: Option<Layer>,
    pub extras: BTreeMap<String, String>,
}

impl Step {
    pub fn new(name: impl Into<String>, layer: impl Into<Option<Layer>>) -> Self {
        Self {
            name: name.into(),
            layer: layer.into(),
            extras: BTreeMap::new(),
        }
    }

    /// A grouping step with no layer of its own
    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    pub fn model(name: impl Into<String>) -> Self {
        Self::new(name, Layer::Model)
    }

    pub fn view(name: impl Into<String>) -> Self {
        Self::new(name, Layer::View)
    }

    pub fn controller(name: impl Into<String>) -> Self {
        Self::new(name, Layer::Controller)
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }
}

/// Recording state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// On the recording stack, still accepting children
    Open,
    /// Duration stamped; immutable from here on
    Closed(Duration),
}

/// One node of a trace tree
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub(crate) name: Option<String>,
    pub(crate) layer: Option<Layer>,
    pub(crate) extras: BTreeMap<String, String>,
    pub(crate) duration: Option<Duration>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) portions: OnceCell<LayerPortions>,
}

impl Node {
    pub(crate) fn root() -> Self {
        Self::default()
    }

    pub(crate) fn from_step(step: Step, parent: NodeId) -> Self {
        Self {
            name: Some(step.name),
            layer: step.layer,
            extras: step.extras,
            parent: Some(parent),
            ..Self::default()
        }
    }

    /// `None` only on the root
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name used in logs, errors and summaries
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(ROOT_FRAME_NAME)
    }

    pub fn layer(&self) -> Option<Layer> {
        self.layer
    }

    pub fn extras(&self) -> &BTreeMap<String, String> {
        &self.extras
    }

    /// `None` while the node is still open
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Children in start order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn state(&self) -> NodeState {
        match self.duration {
            Some(duration) => NodeState::Closed(duration),
            None => NodeState::Open,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_builders() {
        let step = Step::model("Find users").with_extra("sql", "SELECT * FROM users");
        assert_eq!(step.layer, Some(Layer::Model));
        assert_eq!(step.extras.get("sql").map(String::as_str), Some("SELECT * FROM users"));

        assert_eq!(Step::container("Filters").layer, None);
    }

    #[test]
    fn test_node_state() {
        let mut node = Node::from_step(Step::view("Render"), NodeId::ROOT);
        assert_eq!(node.state(), NodeState::Open);
        assert!(!node.is_root());

        node.duration = Some(Duration::from_millis(3));
        assert_eq!(node.state(), NodeState::Closed(Duration::from_millis(3)));
    }

    #[test]
    fn test_root_display_name() {
        let root = Node::root();
        assert!(root.is_root());
        assert_eq!(root.name(), None);
        assert_eq!(root.display_name(), ROOT_FRAME_NAME);
    }
}
