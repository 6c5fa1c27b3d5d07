//! Point-in-time configuration of a container
//!
//! Derived on demand from a node's inspect call. It is the source of truth for
//! reconstructing a container's launch configuration.

use serde::{Deserialize, Serialize};

use crate::plan::PortMapping;

/// Restart policy name meaning "never restart"
pub const RESTART_POLICY_NO: &str = "no";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectSnapshot {
    /// Canonical container name without the leading `/`
    pub name: Option<String>,
    pub image: Option<String>,
    /// `KEY=VALUE` entries in container order
    pub env: Vec<String>,
    /// Published ports, ordered by container port then host port
    pub ports: Vec<PortMapping>,
    /// Normalized restart policy name (`no`, `always`, `on-failure`, `unless-stopped`)
    pub restart_policy: String,
}

impl Default for InspectSnapshot {
    fn default() -> Self {
        Self {
            name: None,
            image: None,
            env: Vec::new(),
            ports: Vec::new(),
            restart_policy: RESTART_POLICY_NO.to_string(),
        }
    }
}

impl InspectSnapshot {
    /// Image reference, ignoring blank values
    pub fn image(&self) -> Option<&str> {
        self.image
            .as_deref()
            .map(str::trim)
            .filter(|image| !image.is_empty())
    }

    /// Canonical name, ignoring blank values
    pub fn canonical_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(|name| name.trim_start_matches('/'))
            .filter(|name| !name.is_empty())
    }

    pub fn restarts(&self) -> bool {
        self.restart_policy != RESTART_POLICY_NO
    }
}

/// Lowercases a restart policy name, mapping empty and `none` to `no`
pub fn normalize_restart_policy(value: &str) -> String {
    let policy = value.trim().to_lowercase();
    if policy.is_empty() || policy == "none" {
        RESTART_POLICY_NO.to_string()
    } else {
        policy
    }
}
