//! Node types as reported by the node registry

use serde::{Deserialize, Serialize};

/// Connectivity status of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Connected,
    #[serde(other)]
    Disconnected,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Connected => "connected",
            NodeStatus::Disconnected => "disconnected",
        }
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A managed host running a container runtime
///
/// Owned by the node registry. The engines only read it and take a fresh
/// snapshot per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "node_id")]
    pub id: String,
    /// Operator-assigned alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub status: NodeStatus,
    #[serde(rename = "remote_addr", default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>, status: NodeStatus) -> Self {
        Self {
            id: id.into(),
            name: None,
            status,
            address: String::new(),
            version: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn is_connected(&self) -> bool {
        self.status == NodeStatus::Connected
    }

    fn alias(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
    }

    /// Human-readable name: the alias, or a shortened id
    pub fn display_name(&self) -> String {
        match self.alias() {
            Some(alias) => alias.to_string(),
            None => {
                let short: String = self.id.chars().take(8).collect();
                format!("{}...", short)
            }
        }
    }

    /// Token safe to embed in a container name (`{node}` in name templates)
    pub fn name_token(&self) -> String {
        let raw = match self.alias() {
            Some(alias) => alias,
            None if !self.id.is_empty() => self.id.as_str(),
            None => "node",
        };
        sanitize_name_token(raw)
    }
}

/// Replaces every character outside `[A-Za-z0-9_.-]` with `-`
pub fn sanitize_name_token(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_alias() {
        let node = Node::new("0123456789abcdef", NodeStatus::Connected).with_name("  edge-1 ");
        assert_eq!(node.display_name(), "edge-1");
    }

    #[test]
    fn test_display_name_falls_back_to_short_id() {
        let node = Node::new("0123456789abcdef", NodeStatus::Connected).with_name("   ");
        assert_eq!(node.display_name(), "01234567...");
    }

    #[test]
    fn test_name_token_is_sanitized() {
        let node = Node::new("id-1", NodeStatus::Connected).with_name("eu west/1");
        assert_eq!(node.name_token(), "eu-west-1");

        let node = Node::new("abc:def", NodeStatus::Connected);
        assert_eq!(node.name_token(), "abc-def");

        let node = Node::new("", NodeStatus::Connected);
        assert_eq!(node.name_token(), "node");
    }

    #[test]
    fn test_registry_wire_format() {
        let node: Node = serde_json::from_value(serde_json::json!({
            "node_id": "n1",
            "name": "alpha",
            "status": "connected",
            "remote_addr": "10.0.0.1:5000",
            "version": "0.3.1",
            "last_seen": 1700000000
        }))
        .unwrap();

        assert_eq!(node.id, "n1");
        assert_eq!(node.name.as_deref(), Some("alpha"));
        assert!(node.is_connected());
        assert_eq!(node.address, "10.0.0.1:5000");
    }

    #[test]
    fn test_unknown_status_is_disconnected() {
        let node: Node = serde_json::from_value(serde_json::json!({
            "node_id": "n2",
            "status": "offline"
        }))
        .unwrap();

        assert_eq!(node.status, NodeStatus::Disconnected);
        assert_eq!(node.address, "");
    }
}
