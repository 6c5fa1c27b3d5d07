//! Sequential bulk actions over scan matches
//!
//! Matches are queued in scan order and processed by a single worker, one at a
//! time. A failing item is recorded in the ledger and never aborts the rest of
//! the batch.

use std::collections::{HashSet, VecDeque};
use std::str::FromStr;
use std::sync::Arc;

use docklet_client::ContainerControl;
use docklet_types::{
    ItemResult, ItemStage, Match, OrchestratorError, OrchestratorResult, RedeployOverrides,
    ResultLedger,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::notify::RefreshNotifier;
use crate::planner::{ParsedOverrides, RedeployPlanner};

/// Operation applied to every match in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    Start,
    Stop,
    Delete,
    /// Stop, delete and recreate from a plan
    Redeploy,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Start => "start",
            BulkAction::Stop => "stop",
            BulkAction::Delete => "delete",
            BulkAction::Redeploy => "redeploy",
        }
    }

    /// Whether the action removes containers
    pub fn is_destructive(&self) -> bool {
        matches!(self, BulkAction::Delete | BulkAction::Redeploy)
    }
}

impl std::fmt::Display for BulkAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BulkAction {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(BulkAction::Start),
            "stop" => Ok(BulkAction::Stop),
            "delete" | "rm" => Ok(BulkAction::Delete),
            "redeploy" => Ok(BulkAction::Redeploy),
            other => Err(OrchestratorError::Validation(format!(
                "unknown action '{}'",
                other
            ))),
        }
    }
}

/// A batch to run: matches from one scan plus the action to apply
#[derive(Debug, Clone)]
pub struct BulkRequest {
    pub matches: Vec<Match>,
    pub action: BulkAction,
    /// Only used by `redeploy`; defaults to keeping everything and auto-restart on
    pub overrides: Option<RedeployOverrides>,
}

/// Failure of one item, with the step it had reached
struct ItemFailure {
    stage: ItemStage,
    message: String,
}

impl ItemFailure {
    fn new(stage: ItemStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

fn item_message(error: OrchestratorError) -> String {
    match error {
        OrchestratorError::NodeUnreachable { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}

pub struct BulkActionExecutor {
    control: Arc<dyn ContainerControl>,
    planner: RedeployPlanner,
    notifier: Arc<dyn RefreshNotifier>,
}

impl BulkActionExecutor {
    pub fn new(control: Arc<dyn ContainerControl>, notifier: Arc<dyn RefreshNotifier>) -> Self {
        Self {
            planner: RedeployPlanner::new(Arc::clone(&control)),
            control,
            notifier,
        }
    }

    /// Apply the request's action to every match, in order
    ///
    /// Returns one ledger entry per attempted match. Cancelling the token stops
    /// the batch between items; the ledger built so far is returned and marked
    /// cancelled.
    pub async fn run(
        &self,
        request: BulkRequest,
        cancel: &CancellationToken,
    ) -> OrchestratorResult<ResultLedger> {
        if request.matches.is_empty() {
            return Err(OrchestratorError::Precondition(
                "no matches to run against".to_string(),
            ));
        }

        let mut keys = HashSet::new();
        if let Some(duplicate) = request.matches.iter().find(|m| !keys.insert(m.key())) {
            return Err(OrchestratorError::Validation(format!(
                "duplicate match {}",
                duplicate.key()
            )));
        }

        let overrides = match request.action {
            BulkAction::Redeploy => Some(ParsedOverrides::parse(
                &request.overrides.unwrap_or_default(),
            )?),
            _ => None,
        };

        info!(
            "Running {} on {} containers",
            request.action,
            request.matches.len()
        );

        let mut queue: VecDeque<Match> = request.matches.into();
        let mut ledger = ResultLedger::new();

        while let Some(item) = queue.pop_front() {
            if cancel.is_cancelled() {
                warn!(
                    "Batch cancelled with {} containers left unprocessed",
                    queue.len() + 1
                );
                ledger.mark_cancelled();
                break;
            }

            let outcome = match &overrides {
                Some(overrides) => self.redeploy(&item, overrides).await,
                None => self.simple_action(&item, request.action).await,
            };

            let result = match outcome {
                Ok(message) => {
                    debug!("{} on {}: {}", item.container.short_id(), item.node_name, message);
                    ItemResult::success(
                        item.key(),
                        &item.node_name,
                        &item.container,
                        message,
                        ItemStage::Completed,
                    )
                }
                Err(failure) => {
                    warn!(
                        "{} {} on {} failed at {}: {}",
                        request.action,
                        item.container.short_id(),
                        item.node_name,
                        failure.stage,
                        failure.message
                    );
                    ItemResult::failure(
                        item.key(),
                        &item.node_name,
                        &item.container,
                        failure.message,
                        failure.stage,
                    )
                }
            };
            ledger.push(result);
        }

        ledger.finish();
        info!("{} finished: {}", request.action, ledger.summary());
        self.notifier.refresh();
        Ok(ledger)
    }

    async fn simple_action(&self, item: &Match, action: BulkAction) -> Result<String, ItemFailure> {
        let node_id = item.node_id.as_str();
        let container_id = item.container.id.as_str();

        let (result, message) = match action {
            BulkAction::Start => (
                self.control.start_container(node_id, container_id).await,
                "started",
            ),
            BulkAction::Stop => (
                self.control.stop_container(node_id, container_id).await,
                "stopped",
            ),
            BulkAction::Delete => (
                self.control.delete_container(node_id, container_id).await,
                "deleted",
            ),
            BulkAction::Redeploy => {
                return Err(ItemFailure::new(
                    ItemStage::Pending,
                    "redeploy needs parsed overrides",
                ))
            }
        };

        result
            .map(|_| message.to_string())
            .map_err(|e| ItemFailure::new(ItemStage::Pending, e.to_string()))
    }

    /// Stop, delete and recreate one container
    ///
    /// Not transactional: if the delete succeeds and the create fails the
    /// container is gone. The failure's stage records how far the item got.
    async fn redeploy(
        &self,
        item: &Match,
        overrides: &ParsedOverrides,
    ) -> Result<String, ItemFailure> {
        let node_id = item.node_id.as_str();
        let container_id = item.container.id.as_str();

        let plan = self
            .planner
            .plan_parsed(item, overrides)
            .await
            .map_err(|e| ItemFailure::new(ItemStage::Pending, item_message(e)))?;
        let mut stage = ItemStage::Planned;

        // A container that is already stopped rejects the stop call
        match self.control.stop_container(node_id, container_id).await {
            Ok(()) => stage = ItemStage::SourceStopped,
            Err(e) => debug!(
                "Ignoring stop failure for {} on {}: {}",
                item.container.short_id(),
                item.node_name,
                e
            ),
        }

        self.control
            .delete_container(node_id, container_id)
            .await
            .map_err(|e| ItemFailure::new(stage, e.to_string()))?;

        self.control
            .create_container(node_id, &plan)
            .await
            .map_err(|e| {
                ItemFailure::new(
                    ItemStage::SourceRemoved,
                    format!("removed but not recreated: {}", e),
                )
            })?;

        Ok(if plan.name.is_empty() {
            "recreated".to_string()
        } else {
            format!("recreated as {}", plan.name)
        })
    }
}
