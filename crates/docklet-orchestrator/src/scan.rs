//! Fan-out container scan across nodes
//!
//! One list call per selected node runs concurrently. Containers are filtered
//! with a case-insensitive substring query and the matches are ordered by
//! node display name, then container id.

use std::collections::HashSet;
use std::sync::Arc;

use docklet_client::ContainerControl;
use docklet_types::{
    ContainerSummary, ControlError, Match, MatchKey, Node, OrchestratorError, OrchestratorResult,
};
use futures::future::{join_all, try_join_all};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// A node whose list call failed during a best-effort scan
#[derive(Debug, Clone, Serialize)]
pub struct NodeScanFailure {
    pub node_id: String,
    pub node_name: String,
    pub message: String,
    #[serde(skip)]
    pub error: ControlError,
}

/// Result of a best-effort scan
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub matches: Vec<Match>,
    pub failures: Vec<NodeScanFailure>,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone)]
pub struct ScanEngine {
    control: Arc<dyn ContainerControl>,
}

impl ScanEngine {
    pub fn new(control: Arc<dyn ContainerControl>) -> Self {
        Self { control }
    }

    /// Scan the given nodes for containers matching `filter`
    ///
    /// All-or-nothing: if any node's list call fails the whole scan fails and
    /// no matches are returned.
    pub async fn scan(&self, nodes: &[Node], filter: &str) -> OrchestratorResult<Vec<Match>> {
        let nodes = distinct_nodes(nodes)?;
        info!("Scanning {} nodes with filter {:?}", nodes.len(), filter.trim());

        let listings = try_join_all(nodes.iter().map(|node| self.list(*node)))
            .await
            .map_err(|(node, error)| {
                error!("Scan aborted, node {} failed: {}", node.display_name(), error);
                OrchestratorError::node_unreachable(node.display_name(), error)
            })?;

        let matches = collect_matches(listings, filter);
        info!("Scan found {} matching containers", matches.len());
        Ok(matches)
    }

    /// Scan that keeps the matches of healthy nodes and reports failed ones
    pub async fn scan_best_effort(
        &self,
        nodes: &[Node],
        filter: &str,
    ) -> OrchestratorResult<ScanReport> {
        let nodes = distinct_nodes(nodes)?;
        info!(
            "Scanning {} nodes (best effort) with filter {:?}",
            nodes.len(),
            filter.trim()
        );

        let mut listings = Vec::new();
        let mut failures = Vec::new();
        for outcome in join_all(nodes.iter().map(|node| self.list(*node))).await {
            match outcome {
                Ok(listing) => listings.push(listing),
                Err((node, error)) => {
                    warn!("Node {} failed during scan: {}", node.display_name(), error);
                    failures.push(NodeScanFailure {
                        node_id: node.id.clone(),
                        node_name: node.display_name(),
                        message: error.to_string(),
                        error,
                    });
                }
            }
        }

        Ok(ScanReport {
            matches: collect_matches(listings, filter),
            failures,
        })
    }

    async fn list<'a>(
        &self,
        node: &'a Node,
    ) -> Result<(&'a Node, Vec<ContainerSummary>), (&'a Node, ControlError)> {
        debug!("Listing containers on {}", node.display_name());
        self.control
            .list_containers(&node.id)
            .await
            .map(|containers| (node, containers))
            .map_err(|error| (node, error))
    }
}

fn distinct_nodes(nodes: &[Node]) -> OrchestratorResult<Vec<&Node>> {
    if nodes.is_empty() {
        return Err(OrchestratorError::Precondition(
            "no nodes selected".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    Ok(nodes
        .iter()
        .filter(|node| seen.insert(node.id.as_str()))
        .collect())
}

fn collect_matches(listings: Vec<(&Node, Vec<ContainerSummary>)>, filter: &str) -> Vec<Match> {
    let query = filter.trim().to_lowercase();
    let mut seen: HashSet<MatchKey> = HashSet::new();
    let mut matches = Vec::new();

    for (node, containers) in listings {
        let node_name = node.display_name();
        let node_token = node.name_token();
        for container in containers {
            if !container.matches_query(&query) {
                continue;
            }
            if !seen.insert(MatchKey::new(node.id.clone(), container.id.clone())) {
                continue;
            }
            matches.push(Match {
                node_id: node.id.clone(),
                node_name: node_name.clone(),
                node_token: node_token.clone(),
                container,
            });
        }
    }

    matches.sort_by(|a, b| {
        a.node_name
            .cmp(&b.node_name)
            .then_with(|| a.container.id.cmp(&b.container.id))
    });
    matches
}
