//! HTTP client for the docklet control plane
//!
//! Talks to the control plane's node API with a bearer token:
//!
//! - `GET    /nodes`
//! - `GET    /nodes/{node}/containers`
//! - `GET    /nodes/{node}/containers/{id}/inspect`
//! - `POST   /nodes/{node}/containers/{id}/start`
//! - `POST   /nodes/{node}/containers/{id}/stop`
//! - `DELETE /nodes/{node}/containers/{id}`
//! - `POST   /nodes/{node}/containers`
//!
//! Node and container ids are percent-encoded as single path segments. Any
//! non-2xx response is a `ControlError` carrying the response body text.

use async_trait::async_trait;
use bollard::models::ContainerInspectResponse;
use docklet_types::{
    ContainerPlan, ContainerSummary, ControlError, ControlResult, InspectSnapshot, Node,
};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::inspect::snapshot_from_inspect;
use crate::traits::{ContainerControl, NodeRegistry};

/// Node registry response body
#[derive(Debug, Deserialize)]
struct NodesResponse {
    #[serde(default)]
    nodes: Vec<Node>,
}

/// Bearer-authenticated client for the control plane's node API
#[derive(Clone)]
pub struct HttpControlClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpControlClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:8080/api`)
    ///
    /// `timeout` bounds every individual request.
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> ControlResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ControlError::transport(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into();
        let base_url = Url::parse(base_url.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ControlError::transport(format!("Invalid base URL: {}", base_url)))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Base URL with `segments` appended, each encoded as one path segment
    fn endpoint(&self, segments: &[&str]) -> ControlResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ControlError::transport(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&ContainerPlan>,
    ) -> ControlResult<Response> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();
        debug!("Control plane request: {} {}", method, path);

        let mut request = self.client.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ControlError::transport(format!("Request to {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Control plane returned {} for {}: {}", status, path, body);
            return Err(ControlError::from_response(status.as_u16(), &body));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ControlResult<T> {
        let response = self.request(Method::GET, segments, None).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ControlError::transport(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&text).map_err(|e| {
            ControlError::transport(format!(
                "Failed to parse response from /{}: {}",
                segments.join("/"),
                e
            ))
        })
    }

    async fn execute(&self, method: Method, segments: &[&str]) -> ControlResult<()> {
        self.request(method, segments, None).await.map(|_| ())
    }
}

#[async_trait]
impl ContainerControl for HttpControlClient {
    async fn list_containers(&self, node_id: &str) -> ControlResult<Vec<ContainerSummary>> {
        // Agents answer `null` when the node has no containers
        let containers: Option<Vec<ContainerSummary>> =
            self.get_json(&["nodes", node_id, "containers"]).await?;
        Ok(containers.unwrap_or_default())
    }

    async fn inspect_container(
        &self,
        node_id: &str,
        container_id: &str,
    ) -> ControlResult<InspectSnapshot> {
        let inspect: ContainerInspectResponse = self
            .get_json(&["nodes", node_id, "containers", container_id, "inspect"])
            .await?;
        Ok(snapshot_from_inspect(inspect))
    }

    async fn start_container(&self, node_id: &str, container_id: &str) -> ControlResult<()> {
        self.execute(
            Method::POST,
            &["nodes", node_id, "containers", container_id, "start"],
        )
        .await
    }

    async fn stop_container(&self, node_id: &str, container_id: &str) -> ControlResult<()> {
        self.execute(
            Method::POST,
            &["nodes", node_id, "containers", container_id, "stop"],
        )
        .await
    }

    async fn delete_container(&self, node_id: &str, container_id: &str) -> ControlResult<()> {
        self.execute(Method::DELETE, &["nodes", node_id, "containers", container_id])
            .await
    }

    async fn create_container(&self, node_id: &str, plan: &ContainerPlan) -> ControlResult<()> {
        self.request(Method::POST, &["nodes", node_id, "containers"], Some(plan))
            .await
        .map(|_| ())
    }
}

#[async_trait]
impl NodeRegistry for HttpControlClient {
    async fn list_nodes(&self) -> ControlResult<Vec<Node>> {
        let response: NodesResponse = self.get_json(&["nodes"]).await?;
        Ok(response.nodes)
    }
}
