//! Collaborator traits for node access
//!
//! Implementations own transport, authentication and timeout policy. Every
//! failure is reported as a `ControlError`.

use async_trait::async_trait;
use docklet_types::{ContainerPlan, ContainerSummary, ControlResult, InspectSnapshot, Node};

/// Per-node container operations
#[async_trait]
pub trait ContainerControl: Send + Sync {
    /// List every container on the node, running or not
    async fn list_containers(&self, node_id: &str) -> ControlResult<Vec<ContainerSummary>>;

    async fn inspect_container(
        &self,
        node_id: &str,
        container_id: &str,
    ) -> ControlResult<InspectSnapshot>;

    async fn start_container(&self, node_id: &str, container_id: &str) -> ControlResult<()>;

    async fn stop_container(&self, node_id: &str, container_id: &str) -> ControlResult<()>;

    /// Force-remove a container
    async fn delete_container(&self, node_id: &str, container_id: &str) -> ControlResult<()>;

    /// Create and start a container from a plan
    async fn create_container(&self, node_id: &str, plan: &ContainerPlan) -> ControlResult<()>;
}

/// Source of the current node list and connectivity
#[async_trait]
pub trait NodeRegistry: Send + Sync {
    async fn list_nodes(&self) -> ControlResult<Vec<Node>>;
}
