//! Conversion of Docker inspect output into an `InspectSnapshot`

use bollard::models::{ContainerInspectResponse, RestartPolicyNameEnum};
use docklet_types::{normalize_restart_policy, InspectSnapshot, PortMapping};

/// Reduce a raw inspect response to the fields needed to recreate the container
pub fn snapshot_from_inspect(inspect: ContainerInspectResponse) -> InspectSnapshot {
    // Extract container name (remove leading /)
    let name = inspect
        .name
        .as_ref()
        .map(|n| n.trim_start_matches('/').to_string())
        .filter(|n| !n.is_empty());

    let (image, env) = match inspect.config {
        Some(config) => (
            config.image.filter(|image| !image.trim().is_empty()),
            config.env.unwrap_or_default(),
        ),
        None => (None, Vec::new()),
    };

    let mut ports = Vec::new();
    let mut restart_policy = normalize_restart_policy("");

    if let Some(host_config) = &inspect.host_config {
        if let Some(port_bindings) = &host_config.port_bindings {
            for (container_port, bindings) in port_bindings {
                let Some(container) = container_port
                    .split('/')
                    .next()
                    .and_then(|port| port.trim().parse::<u16>().ok())
                else {
                    continue;
                };
                for binding in bindings.iter().flatten() {
                    let host = binding
                        .host_port
                        .as_deref()
                        .map(str::trim)
                        .filter(|port| !port.is_empty())
                        .and_then(|port| port.parse::<u16>().ok());
                    if let Some(host) = host {
                        ports.push(PortMapping::new(host, container));
                    }
                }
            }
        }

        let policy = host_config
            .restart_policy
            .as_ref()
            .and_then(|rp| rp.name.as_ref())
            .map(|name| match name {
                RestartPolicyNameEnum::NO | RestartPolicyNameEnum::EMPTY => "no",
                RestartPolicyNameEnum::ALWAYS => "always",
                RestartPolicyNameEnum::ON_FAILURE => "on-failure",
                RestartPolicyNameEnum::UNLESS_STOPPED => "unless-stopped",
            })
            .unwrap_or("no");
        restart_policy = normalize_restart_policy(policy);
    }

    // Bindings come from a map; order them so plans are deterministic
    ports.sort_by_key(|port| (port.container, port.host));
    ports.dedup();

    InspectSnapshot {
        name,
        image,
        env,
        ports,
        restart_policy,
    }
}
