//! Multi-node container orchestration
//!
//! Scans containers across the nodes known to a control plane, applies bulk
//! actions to the matches and migrates whole nodes. All remote work goes
//! through the [`ContainerControl`] and [`NodeRegistry`] traits so the engines
//! can run against the HTTP client or an in-memory fake.

pub mod executor;
pub mod migration;
pub mod notify;
pub mod planner;
pub mod scan;
pub mod selection;

use std::sync::Arc;

use docklet_client::{ContainerControl, HttpControlClient, NodeRegistry};
use docklet_types::{Node, OrchestratorError, OrchestratorResult};
use tracing::debug;

pub use executor::{BulkAction, BulkActionExecutor, BulkRequest};
pub use migration::{MigrationEngine, MigrationRequest};
pub use notify::{NoopNotifier, RefreshNotifier};
pub use planner::{
    build_migration_plan, build_redeploy_plan, parse_env_text, parse_ports_text,
    resolve_name_template, ParsedOverrides, RedeployPlanner,
};
pub use scan::{NodeScanFailure, ScanEngine, ScanReport};
pub use selection::NodeSelection;
pub use tokio_util::sync::CancellationToken;

/// Wires the engines to one control plane
pub struct Orchestrator {
    registry: Arc<dyn NodeRegistry>,
    scanner: ScanEngine,
    executor: BulkActionExecutor,
    migration: MigrationEngine,
}

impl Orchestrator {
    pub fn new(
        control: Arc<dyn ContainerControl>,
        registry: Arc<dyn NodeRegistry>,
        notifier: Arc<dyn RefreshNotifier>,
    ) -> Self {
        Self {
            scanner: ScanEngine::new(Arc::clone(&control)),
            executor: BulkActionExecutor::new(Arc::clone(&control), Arc::clone(&notifier)),
            migration: MigrationEngine::new(control, Arc::clone(&registry), notifier),
            registry,
        }
    }

    /// Use one HTTP client for both container control and the node registry
    pub fn from_client(client: HttpControlClient, notifier: Arc<dyn RefreshNotifier>) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), client, notifier)
    }

    /// Current registry snapshot
    pub async fn nodes(&self) -> OrchestratorResult<Vec<Node>> {
        self.registry
            .list_nodes()
            .await
            .map_err(|e| OrchestratorError::node_unreachable("registry", e))
    }

    /// Resolve a selection against the current registry snapshot
    pub async fn select_nodes(&self, selection: &NodeSelection) -> OrchestratorResult<Vec<Node>> {
        let nodes = self.nodes().await?;
        let selected = selection.resolve(&nodes);
        debug!("Selected {} of {} nodes", selected.len(), nodes.len());
        Ok(selected)
    }

    pub fn scanner(&self) -> &ScanEngine {
        &self.scanner
    }

    pub fn executor(&self) -> &BulkActionExecutor {
        &self.executor
    }

    pub fn migration(&self) -> &MigrationEngine {
        &self.migration
    }
}
