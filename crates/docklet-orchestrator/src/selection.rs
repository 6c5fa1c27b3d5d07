//! Node selection against a registry snapshot

use docklet_types::Node;
use serde::{Deserialize, Serialize};

/// Which nodes an operation targets
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSelection {
    /// Every node currently reporting `connected`
    #[default]
    Connected,
    /// Every known node regardless of status
    All,
    /// Explicit node ids; unknown ids are dropped
    Ids(Vec<String>),
}

impl NodeSelection {
    /// Resolve against a node list, keeping the registry's order
    pub fn resolve(&self, nodes: &[Node]) -> Vec<Node> {
        nodes
            .iter()
            .filter(|node| match self {
                NodeSelection::Connected => node.is_connected(),
                NodeSelection::All => true,
                NodeSelection::Ids(ids) => ids.iter().any(|id| id == &node.id),
            })
            .cloned()
            .collect()
    }
}
