//! Error types for node calls and orchestration operations

use thiserror::Error;

/// Result type for calls against a node's container control API
pub type ControlResult<T> = Result<T, ControlError>;

/// Result type for orchestration operations
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Structured classification of a failed node call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlErrorKind {
    NotFound,
    Conflict,
    Unauthorized,
    Unknown,
}

impl ControlErrorKind {
    /// Classifies an HTTP status, falling back to the message text
    ///
    /// The message fallback only exists because node agents report most
    /// failures as a generic 500 with plain-text bodies. It is best-effort.
    pub fn classify(status: Option<u16>, message: &str) -> Self {
        match status {
            Some(404) => ControlErrorKind::NotFound,
            Some(409) => ControlErrorKind::Conflict,
            Some(401) | Some(403) => ControlErrorKind::Unauthorized,
            _ => Self::from_message(message),
        }
    }

    fn from_message(message: &str) -> Self {
        let message = message.to_lowercase();
        if message.contains("already in use") || message.contains("conflict") {
            ControlErrorKind::Conflict
        } else if message.contains("no such container") {
            ControlErrorKind::NotFound
        } else {
            ControlErrorKind::Unknown
        }
    }
}

/// A failed call against a node's container control API
///
/// Displays as the plain-text message reported by the node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ControlError {
    pub kind: ControlErrorKind,
    /// HTTP status when the node answered at all
    pub status: Option<u16>,
    pub message: String,
}

impl ControlError {
    pub fn new(kind: ControlErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// Builds an error from a non-2xx response and its body text
    pub fn from_response(status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("Request failed: {}", status)
        } else {
            body.to_string()
        };
        Self {
            kind: ControlErrorKind::classify(Some(status), &message),
            status: Some(status),
            message,
        }
    }

    /// Transport-level failure (connection refused, timeout, bad payload)
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: ControlErrorKind::classify(None, &message),
            status: None,
            message,
        }
    }

    /// Whether a create call failed because the container name is taken
    pub fn is_name_conflict(&self) -> bool {
        self.kind == ControlErrorKind::Conflict
    }
}

/// Errors that abort a whole orchestration operation
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Transport or non-2xx failure from a node
    #[error("Node {node} unreachable: {source}")]
    NodeUnreachable {
        node: String,
        #[source]
        source: ControlError,
    },

    /// Locally detected invalid input, raised before any remote call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Batch-level gating failure
    #[error("Precondition failed: {0}")]
    Precondition(String),
}

impl OrchestratorError {
    pub fn node_unreachable(node: impl Into<String>, source: ControlError) -> Self {
        OrchestratorError::NodeUnreachable {
            node: node.into(),
            source,
        }
    }
}
