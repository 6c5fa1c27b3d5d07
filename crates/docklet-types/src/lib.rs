//! Core types for the docklet orchestration engine
//!
//! This crate holds the data model shared by the node client and the
//! orchestration engines.
//!
//! # Architecture
//!
//! - **Nodes**: `Node` as reported by the node registry
//! - **Containers**: `ContainerSummary` from list calls, `InspectSnapshot` from inspect calls
//! - **Plans**: `ContainerPlan`, the create payload built for redeploys and migrations
//! - **Results**: `ItemResult` and the append-only `ResultLedger`
//! - **Errors**: `ControlError` for collaborator failures, `OrchestratorError` for operations

pub mod container;
pub mod error;
pub mod ledger;
pub mod matches;
pub mod node;
pub mod plan;
pub mod snapshot;

pub use container::ContainerSummary;
pub use error::{ControlError, ControlErrorKind, ControlResult, OrchestratorError, OrchestratorResult};
pub use ledger::{ItemResult, ItemStage, ResultLedger};
pub use matches::{Match, MatchKey};
pub use node::{Node, NodeStatus};
pub use plan::{ContainerPlan, PortMapping, RedeployOverrides};
pub use snapshot::{normalize_restart_policy, InspectSnapshot};
