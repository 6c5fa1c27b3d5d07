//! In-memory cluster used by the orchestrator integration tests
#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docklet_client::{ContainerControl, NodeRegistry};
use docklet_orchestrator::{Orchestrator, RefreshNotifier};
use docklet_types::{
    ContainerPlan, ContainerSummary, ControlError, ControlErrorKind, ControlResult,
    InspectSnapshot, Node, NodeStatus,
};

/// A remote call observed by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListNodes,
    List(String),
    Inspect(String, String),
    Start(String, String),
    Stop(String, String),
    Delete(String, String),
    Create(String, ContainerPlan),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::Start(..) | Call::Stop(..) | Call::Delete(..) | Call::Create(..)
        )
    }
}

#[derive(Debug, Clone)]
struct FakeContainer {
    summary: ContainerSummary,
    snapshot: InspectSnapshot,
}

#[derive(Default)]
struct State {
    nodes: Vec<Node>,
    containers: HashMap<String, Vec<FakeContainer>>,
    failing_lists: HashSet<String>,
    failing_stops: HashSet<String>,
    failing_deletes: HashSet<String>,
    create_failures: HashMap<String, VecDeque<ControlError>>,
    registry_error: Option<ControlError>,
    calls: Vec<Call>,
    next_id: usize,
}

#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
    refreshes: AtomicUsize,
}

impl FakeCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_node(&self, id: &str, name: &str, status: NodeStatus) {
        let mut state = self.state.lock().unwrap();
        state.nodes.push(Node::new(id, status).with_name(name));
        state.containers.entry(id.to_string()).or_default();
    }

    /// Adds a running container and returns its id
    pub fn add_container(&self, node_id: &str, name: &str, image: &str) -> String {
        self.add_container_with(
            node_id,
            InspectSnapshot {
                name: Some(name.to_string()),
                image: Some(image.to_string()),
                ..Default::default()
            },
        )
    }

    pub fn add_container_with(&self, node_id: &str, snapshot: InspectSnapshot) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("{:064x}", state.next_id);
        let container = FakeContainer {
            summary: ContainerSummary {
                id: id.clone(),
                image: snapshot.image.clone().unwrap_or_default(),
                names: snapshot
                    .name
                    .iter()
                    .map(|name| format!("/{}", name))
                    .collect(),
                status: "Up 2 hours".to_string(),
                state: "running".to_string(),
            },
            snapshot,
        };
        state
            .containers
            .entry(node_id.to_string())
            .or_default()
            .push(container);
        id
    }

    pub fn fail_list(&self, node_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_lists
            .insert(node_id.to_string());
    }

    pub fn fail_stop(&self, container_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_stops
            .insert(container_id.to_string());
    }

    pub fn fail_delete(&self, container_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_deletes
            .insert(container_id.to_string());
    }

    /// Queue an error for the next create call on a node
    pub fn fail_next_create(&self, node_id: &str, message: &str) {
        self.state
            .lock()
            .unwrap()
            .create_failures
            .entry(node_id.to_string())
            .or_default()
            .push_back(ControlError::from_response(500, message));
    }

    pub fn fail_registry(&self, message: &str) {
        self.state.lock().unwrap().registry_error =
            Some(ControlError::from_response(502, message));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Names of the containers on a node, in creation order
    pub fn container_names(&self, node_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .containers
            .get(node_id)
            .map(|containers| {
                containers
                    .iter()
                    .map(|c| c.summary.primary_name())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn container_state(&self, node_id: &str, container_id: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .containers
            .get(node_id)?
            .iter()
            .find(|c| c.summary.id == container_id)
            .map(|c| c.summary.state.clone())
    }

    pub fn snapshot_named(&self, node_id: &str, name: &str) -> Option<InspectSnapshot> {
        let state = self.state.lock().unwrap();
        state
            .containers
            .get(node_id)?
            .iter()
            .find(|c| c.summary.primary_name() == name)
            .map(|c| c.snapshot.clone())
    }

    pub fn orchestrator(self: &Arc<Self>) -> Orchestrator {
        Orchestrator::new(self.clone(), self.clone(), self.clone())
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn with_container<T>(
        &self,
        node_id: &str,
        container_id: &str,
        f: impl FnOnce(&mut Vec<FakeContainer>, usize) -> T,
    ) -> ControlResult<T> {
        let mut state = self.state.lock().unwrap();
        let containers = state
            .containers
            .get_mut(node_id)
            .ok_or_else(|| ControlError::from_response(404, "node not connected"))?;
        let index = containers
            .iter()
            .position(|c| c.summary.id == container_id)
            .ok_or_else(|| {
                ControlError::from_response(404, &format!("No such container: {}", container_id))
            })?;
        Ok(f(containers, index))
    }
}

#[async_trait]
impl NodeRegistry for FakeCluster {
    async fn list_nodes(&self) -> ControlResult<Vec<Node>> {
        self.record(Call::ListNodes);
        let state = self.state.lock().unwrap();
        match &state.registry_error {
            Some(error) => Err(error.clone()),
            None => Ok(state.nodes.clone()),
        }
    }
}

#[async_trait]
impl ContainerControl for FakeCluster {
    async fn list_containers(&self, node_id: &str) -> ControlResult<Vec<ContainerSummary>> {
        self.record(Call::List(node_id.to_string()));
        let state = self.state.lock().unwrap();
        if state.failing_lists.contains(node_id) {
            return Err(ControlError::transport(format!(
                "error sending request for url (http://agent/api/nodes/{}/containers)",
                node_id
            )));
        }
        Ok(state
            .containers
            .get(node_id)
            .map(|containers| containers.iter().map(|c| c.summary.clone()).collect())
            .unwrap_or_default())
    }

    async fn inspect_container(
        &self,
        node_id: &str,
        container_id: &str,
    ) -> ControlResult<InspectSnapshot> {
        self.record(Call::Inspect(node_id.to_string(), container_id.to_string()));
        self.with_container(node_id, container_id, |containers, i| {
            containers[i].snapshot.clone()
        })
    }

    async fn start_container(&self, node_id: &str, container_id: &str) -> ControlResult<()> {
        self.record(Call::Start(node_id.to_string(), container_id.to_string()));
        self.with_container(node_id, container_id, |containers, i| {
            containers[i].summary.state = "running".to_string();
        })
    }

    async fn stop_container(&self, node_id: &str, container_id: &str) -> ControlResult<()> {
        self.record(Call::Stop(node_id.to_string(), container_id.to_string()));
        if self.state.lock().unwrap().failing_stops.contains(container_id) {
            return Err(ControlError::from_response(500, "container already stopped"));
        }
        self.with_container(node_id, container_id, |containers, i| {
            containers[i].summary.state = "exited".to_string();
        })
    }

    async fn delete_container(&self, node_id: &str, container_id: &str) -> ControlResult<()> {
        self.record(Call::Delete(node_id.to_string(), container_id.to_string()));
        if self.state.lock().unwrap().failing_deletes.contains(container_id) {
            return Err(ControlError::from_response(500, "device or resource busy"));
        }
        self.with_container(node_id, container_id, |containers, i| {
            containers.remove(i);
        })
    }

    async fn create_container(&self, node_id: &str, plan: &ContainerPlan) -> ControlResult<()> {
        self.record(Call::Create(node_id.to_string(), plan.clone()));
        {
            let mut state = self.state.lock().unwrap();
            if let Some(error) = state
                .create_failures
                .get_mut(node_id)
                .and_then(VecDeque::pop_front)
            {
                return Err(error);
            }
            let taken = state
                .containers
                .get(node_id)
                .map(|containers| {
                    containers
                        .iter()
                        .any(|c| !plan.name.is_empty() && c.summary.primary_name() == plan.name)
                })
                .unwrap_or(false);
            if taken {
                return Err(ControlError::new(
                    ControlErrorKind::Conflict,
                    format!("container name \"/{}\" already in use", plan.name),
                ));
            }
        }

        let restart_policy = match &plan.restart_policy {
            Some(policy) => policy.clone(),
            None if plan.auto_restart => "unless-stopped".to_string(),
            None => "no".to_string(),
        };
        self.add_container_with(
            node_id,
            InspectSnapshot {
                name: (!plan.name.is_empty()).then(|| plan.name.clone()),
                image: Some(plan.image.clone()),
                env: plan.env.clone(),
                ports: plan.ports.clone(),
                restart_policy,
            },
        );
        Ok(())
    }
}

impl RefreshNotifier for FakeCluster {
    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Two connected nodes `A` and `B` plus a disconnected node `C`
pub fn three_node_cluster() -> Arc<FakeCluster> {
    let cluster = FakeCluster::new();
    cluster.add_node("node-a-0001", "A", NodeStatus::Connected);
    cluster.add_node("node-b-0002", "B", NodeStatus::Connected);
    cluster.add_node("node-c-0003", "C", NodeStatus::Disconnected);
    cluster
}
