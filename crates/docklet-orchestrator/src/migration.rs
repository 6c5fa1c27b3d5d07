//! Copy every container of one node onto another
//!
//! Migration is not transactional. Each container is recreated on the target
//! before the source copy is removed, and a failed removal leaves both copies
//! running. The ledger message says so.

use std::sync::Arc;

use docklet_client::{ContainerControl, NodeRegistry};
use docklet_types::{
    ContainerPlan, ContainerSummary, ItemResult, ItemStage, MatchKey, Node, OrchestratorError,
    OrchestratorResult, ResultLedger,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::notify::RefreshNotifier;
use crate::planner::build_migration_plan;

/// Parameters of a node-to-node migration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRequest {
    pub source_node_id: String,
    pub target_node_id: String,
    /// Leave the source containers in place after copying
    #[serde(default)]
    pub keep_source: bool,
    /// Explicit operator confirmation; nothing runs without it
    #[serde(default)]
    pub confirmed: bool,
}

impl MigrationRequest {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_node_id: source.into(),
            target_node_id: target.into(),
            keep_source: false,
            confirmed: false,
        }
    }

    pub fn keep_source(mut self, keep: bool) -> Self {
        self.keep_source = keep;
        self
    }

    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }
}

struct Endpoints {
    source: Node,
    target: Node,
}

pub struct MigrationEngine {
    control: Arc<dyn ContainerControl>,
    registry: Arc<dyn NodeRegistry>,
    notifier: Arc<dyn RefreshNotifier>,
}

impl MigrationEngine {
    pub fn new(
        control: Arc<dyn ContainerControl>,
        registry: Arc<dyn NodeRegistry>,
        notifier: Arc<dyn RefreshNotifier>,
    ) -> Self {
        Self {
            control,
            registry,
            notifier,
        }
    }

    /// Number of containers a migration from `node_id` would copy
    pub async fn count_source_containers(&self, node_id: &str) -> OrchestratorResult<usize> {
        let containers = self
            .control
            .list_containers(node_id)
            .await
            .map_err(|e| OrchestratorError::node_unreachable(node_id, e))?;
        Ok(containers.len())
    }

    /// Copy all containers from the source node to the target node
    ///
    /// Preconditions are checked before any remote mutation. After that every
    /// container produces exactly one ledger entry, processed in listing order.
    pub async fn migrate(
        &self,
        request: &MigrationRequest,
        cancel: &CancellationToken,
    ) -> OrchestratorResult<ResultLedger> {
        let endpoints = self.check_preconditions(request).await?;
        let source = &endpoints.source;
        let target = &endpoints.target;
        let source_name = source.display_name();
        let target_name = target.display_name();

        let containers = self
            .control
            .list_containers(&source.id)
            .await
            .map_err(|e| {
                error!("Migration aborted, cannot list {}: {}", source_name, e);
                OrchestratorError::node_unreachable(source_name.clone(), e)
            })?;

        if containers.is_empty() {
            return Err(OrchestratorError::Precondition(
                "no containers to migrate".to_string(),
            ));
        }

        info!(
            "Migrating {} containers from {} to {} (keep source: {})",
            containers.len(),
            source_name,
            target_name,
            request.keep_source
        );

        let mut ledger = ResultLedger::new();

        for (index, container) in containers.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(
                    "Migration cancelled with {} containers left",
                    containers.len() - index
                );
                ledger.mark_cancelled();
                break;
            }

            let key = MatchKey::new(source.id.clone(), container.id.clone());
            let result = match self
                .migrate_one(request, source, target, container, index + 1)
                .await
            {
                Ok((message, stage)) if stage == ItemStage::Completed => {
                    ItemResult::success(key, &source_name, container, message, stage)
                }
                Ok((message, stage)) => {
                    ItemResult::failure(key, &source_name, container, message, stage)
                }
                Err((message, stage)) => {
                    warn!(
                        "Migration of {} failed at {}: {}",
                        container.short_id(),
                        stage,
                        message
                    );
                    ItemResult::failure(key, &source_name, container, message, stage)
                }
            };
            ledger.push(result);
        }

        ledger.finish();
        info!("Migration finished: {}", ledger.summary());
        self.notifier.refresh();
        Ok(ledger)
    }

    async fn check_preconditions(
        &self,
        request: &MigrationRequest,
    ) -> OrchestratorResult<Endpoints> {
        let source_id = request.source_node_id.trim();
        let target_id = request.target_node_id.trim();

        if source_id.is_empty() || target_id.is_empty() {
            return Err(OrchestratorError::Precondition(
                "source and target nodes are required".to_string(),
            ));
        }
        if source_id == target_id {
            return Err(OrchestratorError::Precondition(
                "source and target must be different nodes".to_string(),
            ));
        }
        if !request.confirmed {
            return Err(OrchestratorError::Precondition(
                "migration not confirmed".to_string(),
            ));
        }

        let nodes = self
            .registry
            .list_nodes()
            .await
            .map_err(|e| OrchestratorError::node_unreachable("registry", e))?;

        let find = |id: &str| -> OrchestratorResult<Node> {
            let node = nodes
                .iter()
                .find(|n| n.id == id)
                .cloned()
                .ok_or_else(|| OrchestratorError::Precondition(format!("node {} not found", id)))?;
            if !node.is_connected() {
                return Err(OrchestratorError::Precondition(format!(
                    "node {} is not connected",
                    node.display_name()
                )));
            }
            Ok(node)
        };

        Ok(Endpoints {
            source: find(source_id)?,
            target: find(target_id)?,
        })
    }

    /// Returns the message and the furthest stage reached. `Ok` with a stage
    /// short of `Completed` means the copy exists but the source was not removed.
    async fn migrate_one(
        &self,
        request: &MigrationRequest,
        source: &Node,
        target: &Node,
        container: &ContainerSummary,
        index: usize,
    ) -> Result<(String, ItemStage), (String, ItemStage)> {
        let snapshot = self
            .control
            .inspect_container(&source.id, &container.id)
            .await
            .map_err(|e| (e.to_string(), ItemStage::Pending))?;

        let plan = build_migration_plan(container, &snapshot)
            .map_err(|e| (e.to_string(), ItemStage::Pending))?;

        let created = self
            .create_with_conflict_retry(&target.id, plan, index)
            .await
            .map_err(|e| (e, ItemStage::Planned))?;

        let target_name = target.display_name();
        let created_on = created_message(&target_name, &created.name);
        if request.keep_source {
            return Ok((format!("{}; source kept", created_on), ItemStage::Completed));
        }

        match self
            .control
            .delete_container(&source.id, &container.id)
            .await
        {
            Ok(()) => Ok((
                format!("{}; removed from source", created_on),
                ItemStage::Completed,
            )),
            Err(e) => {
                warn!(
                    "{} copied to {} but source removal failed, both copies exist: {}",
                    container.short_id(),
                    target_name,
                    e
                );
                Ok((
                    format!("{}; failed to remove from source: {}", created_on, e),
                    ItemStage::TargetCreated,
                ))
            }
        }
    }

    /// Create on the target, retrying once under a derived name on a name clash
    async fn create_with_conflict_retry(
        &self,
        target_id: &str,
        plan: ContainerPlan,
        index: usize,
    ) -> Result<ContainerPlan, String> {
        match self.control.create_container(target_id, &plan).await {
            Ok(()) => Ok(plan),
            Err(e) if e.is_name_conflict() && !plan.name.is_empty() => {
                let retry = plan.renamed(format!("{}-migrated-{}", plan.name, index));
                debug!(
                    "Name {} taken on {}, retrying as {}",
                    plan.name, target_id, retry.name
                );
                self.control
                    .create_container(target_id, &retry)
                    .await
                    .map(|_| retry)
                    .map_err(|e| e.to_string())
            }
            Err(e) => Err(e.to_string()),
        }
    }
}

/// `created on <target> as <name>`, without the name part for unnamed containers
fn created_message(target_name: &str, container_name: &str) -> String {
    if container_name.is_empty() {
        format!("created on {}", target_name)
    } else {
        format!("created on {} as {}", target_name, container_name)
    }
}
