//! Create payloads built for redeploys and migrations

use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, OrchestratorResult};

/// Host-to-container port binding
///
/// The node API carries ports as decimal strings, so both sides serialize as
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortMapping {
    #[serde(with = "port_string")]
    pub host: u16,
    #[serde(with = "port_string")]
    pub container: u16,
}

impl PortMapping {
    pub fn new(host: u16, container: u16) -> Self {
        Self { host, container }
    }
}

impl std::fmt::Display for PortMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.container)
    }
}

mod port_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(port: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&port.to_string())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u16),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(port) => Ok(port),
            Raw::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid port: {}", text))),
        }
    }
}

/// Launch configuration for a container to be created on a node
///
/// Serves as both the redeploy plan and the migration plan. Built per item,
/// never persisted. Serializes to the node API create body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPlan {
    pub image: String,
    pub name: String,
    pub ports: Vec<PortMapping>,
    pub env: Vec<String>,
    pub auto_restart: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<String>,
}

impl ContainerPlan {
    /// Rejects plans that would fail creation on the node
    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.image.trim().is_empty() {
            return Err(OrchestratorError::Validation("image required".to_string()));
        }
        Ok(())
    }

    /// Same plan under a different container name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}

/// Operator overrides applied when redeploying a container
///
/// Empty text fields mean "keep what the container has today".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeployOverrides {
    #[serde(default)]
    pub image: Option<String>,
    /// Supports `{node}` and `{name}` placeholders
    #[serde(default)]
    pub name_template: Option<String>,
    /// One `KEY=VALUE` per line
    #[serde(default)]
    pub env_text: Option<String>,
    /// One `host:container` per line
    #[serde(default)]
    pub ports_text: Option<String>,
    pub auto_restart: bool,
}

impl Default for RedeployOverrides {
    fn default() -> Self {
        Self {
            image: None,
            name_template: None,
            env_text: None,
            ports_text: None,
            auto_restart: true,
        }
    }
}
