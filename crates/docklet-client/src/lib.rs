//! Docklet node clients
//!
//! Defines the per-node container control surface and the node registry as
//! traits, and provides an HTTP implementation of both against the docklet
//! control plane.

pub mod http;
pub mod inspect;
pub mod traits;

pub use http::HttpControlClient;
pub use inspect::snapshot_from_inspect;
pub use traits::{ContainerControl, NodeRegistry};
