//! Launch configuration planning for redeploys and migrations
//!
//! Planning is side-effect free apart from the inspect call: a plan is built
//! from the container's inspect snapshot plus operator overrides and validated
//! before anything is created.

use std::sync::Arc;

use docklet_client::ContainerControl;
use docklet_types::{
    ContainerPlan, ContainerSummary, InspectSnapshot, Match, OrchestratorError,
    OrchestratorResult, PortMapping, RedeployOverrides,
};
use tracing::debug;

/// Redeploy overrides after local parsing and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOverrides {
    pub image: Option<String>,
    pub name_template: Option<String>,
    pub env: Option<Vec<String>>,
    pub ports: Option<Vec<PortMapping>>,
    pub auto_restart: bool,
}

impl ParsedOverrides {
    /// Parse operator input; blank fields fall back to the container's current values
    pub fn parse(overrides: &RedeployOverrides) -> OrchestratorResult<Self> {
        Ok(Self {
            image: non_blank(overrides.image.as_deref()).map(str::to_string),
            name_template: non_blank(overrides.name_template.as_deref()).map(str::to_string),
            env: match non_blank(overrides.env_text.as_deref()) {
                Some(text) => Some(parse_env_text(text)),
                None => None,
            },
            ports: match non_blank(overrides.ports_text.as_deref()) {
                Some(text) => Some(parse_ports_text(text)?),
                None => None,
            },
            auto_restart: overrides.auto_restart,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Split env text into entries, one per trimmed non-blank line
///
/// Lines are passed through unchanged; a bare `KEY` is valid for Docker and
/// forwards the variable from the node's environment.
pub fn parse_env_text(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `host:container` lines
///
/// Blank lines and lines missing either side are dropped. A side that is not
/// a port number is rejected.
pub fn parse_ports_text(text: &str) -> OrchestratorResult<Vec<PortMapping>> {
    let mut ports = Vec::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let mut parts = line.split(':').map(str::trim);
        let host = parts.next().unwrap_or_default();
        let container = parts.next().unwrap_or_default();
        if host.is_empty() || container.is_empty() {
            continue;
        }
        let parse = |value: &str| {
            value.parse::<u16>().map_err(|_| {
                OrchestratorError::Validation(format!(
                    "invalid port mapping '{}', expected host:container",
                    line
                ))
            })
        };
        ports.push(PortMapping::new(parse(host)?, parse(container)?));
    }
    Ok(ports)
}

/// Apply a name template
///
/// `{node}` becomes the node token and `{name}` the container's primary name.
/// A blank template yields `fallback`.
pub fn resolve_name_template(
    template: Option<&str>,
    node_token: &str,
    container: &ContainerSummary,
    fallback: &str,
) -> String {
    let Some(template) = non_blank(template) else {
        return fallback.to_string();
    };

    let primary = container.primary_name();
    let name = if !primary.is_empty() {
        primary.as_str()
    } else if !fallback.is_empty() {
        fallback
    } else {
        "container"
    };

    template.replace("{node}", node_token).replace("{name}", name)
}

fn current_name(container: &ContainerSummary, snapshot: &InspectSnapshot) -> String {
    snapshot
        .canonical_name()
        .map(str::to_string)
        .unwrap_or_else(|| container.primary_name())
}

fn current_image(container: &ContainerSummary, snapshot: &InspectSnapshot) -> Option<String> {
    snapshot
        .image()
        .or_else(|| non_blank(Some(container.image.as_str())))
        .map(str::to_string)
}

/// Build the create payload used to redeploy a matched container
pub fn build_redeploy_plan(
    item: &Match,
    snapshot: &InspectSnapshot,
    overrides: &ParsedOverrides,
) -> OrchestratorResult<ContainerPlan> {
    let old_name = current_name(&item.container, snapshot);

    let plan = ContainerPlan {
        image: overrides
            .image
            .clone()
            .or_else(|| current_image(&item.container, snapshot))
            .unwrap_or_default(),
        name: resolve_name_template(
            overrides.name_template.as_deref(),
            &item.node_token,
            &item.container,
            &old_name,
        ),
        env: overrides
            .env
            .clone()
            .unwrap_or_else(|| snapshot.env.clone()),
        ports: overrides
            .ports
            .clone()
            .unwrap_or_else(|| snapshot.ports.clone()),
        auto_restart: overrides.auto_restart,
        restart_policy: None,
    };

    plan.validate()?;
    Ok(plan)
}

/// Build the create payload that reproduces a container on another node
pub fn build_migration_plan(
    container: &ContainerSummary,
    snapshot: &InspectSnapshot,
) -> OrchestratorResult<ContainerPlan> {
    let restarts = snapshot.restarts();

    let plan = ContainerPlan {
        image: current_image(container, snapshot).unwrap_or_default(),
        name: current_name(container, snapshot),
        env: snapshot.env.clone(),
        ports: snapshot.ports.clone(),
        auto_restart: restarts,
        restart_policy: restarts.then(|| snapshot.restart_policy.clone()),
    };

    plan.validate()?;
    Ok(plan)
}

/// Builds redeploy plans from a container's live configuration
#[derive(Clone)]
pub struct RedeployPlanner {
    control: Arc<dyn ContainerControl>,
}

impl RedeployPlanner {
    pub fn new(control: Arc<dyn ContainerControl>) -> Self {
        Self { control }
    }

    /// Inspect the matched container and build its redeploy plan
    pub async fn plan(
        &self,
        item: &Match,
        overrides: &RedeployOverrides,
    ) -> OrchestratorResult<ContainerPlan> {
        let overrides = ParsedOverrides::parse(overrides)?;
        self.plan_parsed(item, &overrides).await
    }

    pub(crate) async fn plan_parsed(
        &self,
        item: &Match,
        overrides: &ParsedOverrides,
    ) -> OrchestratorResult<ContainerPlan> {
        debug!(
            "Planning redeploy of {} on {}",
            item.container.short_id(),
            item.node_name
        );

        let snapshot = self
            .control
            .inspect_container(&item.node_id, &item.container.id)
            .await
            .map_err(|e| OrchestratorError::node_unreachable(item.node_name.clone(), e))?;

        build_redeploy_plan(item, &snapshot, overrides)
    }
}
