//! Scan matches: a (node, container) pair that satisfied a filter

use serde::{Deserialize, Serialize};

use crate::container::ContainerSummary;

/// Unique key of a match within one scan result
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchKey {
    pub node_id: String,
    pub container_id: String,
}

impl MatchKey {
    pub fn new(node_id: impl Into<String>, container_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            container_id: container_id.into(),
        }
    }
}

impl std::fmt::Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.node_id, self.container_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub node_id: String,
    pub node_name: String,
    /// Sanitized node token used for `{node}` in name templates
    pub node_token: String,
    pub container: ContainerSummary,
}

impl Match {
    pub fn key(&self) -> MatchKey {
        MatchKey::new(self.node_id.clone(), self.container.id.clone())
    }
}
