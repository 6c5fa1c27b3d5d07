//! Subcommands and the pieces they share

pub mod count;
pub mod migrate;
pub mod nodes;
pub mod run;
pub mod scan;

pub use count::CountCommand;
pub use migrate::MigrateCommand;
pub use nodes::NodesCommand;
pub use run::RunCommand;
pub use scan::ScanCommand;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use docklet_client::HttpControlClient;
use docklet_config::{ConfigOverrides, OrchestratorConfig};
use docklet_orchestrator::{CancellationToken, NodeSelection, NoopNotifier, Orchestrator};
use docklet_types::{Match, ResultLedger};
use tracing::{debug, warn};

const RULE: &str = "═══════════════════════════════════════════════════════════════";

/// How to reach the control plane
#[derive(Args, Clone, Debug)]
pub struct ConnectionArgs {
    /// Control plane API base URL
    #[arg(long, env = "DOCKLET_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token (falls back to <data-dir>/token)
    #[arg(long, env = "DOCKLET_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Data directory holding the token file
    #[arg(long, env = "DOCKLET_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, env = "DOCKLET_REQUEST_TIMEOUT_SECS")]
    pub timeout: Option<u64>,
}

impl ConnectionArgs {
    pub fn orchestrator(&self) -> anyhow::Result<Orchestrator> {
        let config = OrchestratorConfig::load(ConfigOverrides {
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            data_dir: self.data_dir.clone(),
            request_timeout_secs: self.timeout,
        })
        .context("Failed to load configuration")?;
        debug!("Using control plane at {}", config.api_base());

        let client = HttpControlClient::new(
            config.api_base(),
            config.token.clone(),
            config.request_timeout,
        )?;
        Ok(Orchestrator::from_client(client, Arc::new(NoopNotifier)))
    }
}

/// Which nodes to scan and what to look for
#[derive(Args, Clone, Debug)]
pub struct TargetArgs {
    /// Node id to include (repeatable); defaults to every connected node
    #[arg(long = "node", value_name = "ID")]
    pub nodes: Vec<String>,

    /// Include disconnected nodes too
    #[arg(long, conflicts_with = "nodes")]
    pub all: bool,

    /// Case-insensitive substring matched against id, image, names, state and status
    #[arg(long, short = 'f', default_value = "")]
    pub filter: String,
}

impl TargetArgs {
    pub fn selection(&self) -> NodeSelection {
        if !self.nodes.is_empty() {
            NodeSelection::Ids(self.nodes.clone())
        } else if self.all {
            NodeSelection::All
        } else {
            NodeSelection::Connected
        }
    }
}

pub fn print_header(title: &str) {
    println!();
    println!("{}", RULE.bright_blue());
    println!("{}", format!("  {}", title).bright_blue().bold());
    println!("{}", RULE.bright_blue());
    println!();
}

pub fn print_matches(matches: &[Match]) {
    if matches.is_empty() {
        println!("  {} No matching containers.", "ℹ".bright_blue());
        println!();
        return;
    }

    println!(
        "  {:<16} {:<14} {:<28} {:<32} {:<10}",
        "NODE".bright_white().bold(),
        "ID".bright_white().bold(),
        "NAME".bright_white().bold(),
        "IMAGE".bright_white().bold(),
        "STATE".bright_white().bold()
    );
    println!("  {}", "─".repeat(104));

    for item in matches {
        let state = match item.container.state.as_str() {
            "running" => item.container.state.bright_green(),
            "exited" | "dead" => item.container.state.bright_red(),
            "" => "unknown".normal(),
            _ => item.container.state.bright_yellow(),
        };
        println!(
            "  {:<16} {:<14} {:<28} {:<32} {:<10}",
            item.node_name.bright_cyan(),
            item.container.short_id(),
            item.container.primary_name(),
            item.container.image,
            state
        );
    }
    println!();
}

/// Print every ledger entry and the summary line
pub fn print_ledger(ledger: &ResultLedger) {
    for entry in ledger {
        let mark = if entry.ok {
            "✓".bright_green()
        } else {
            "✗".bright_red()
        };
        let name = if entry.container_name.is_empty() {
            entry.container_id.clone()
        } else {
            format!("{} ({})", entry.container_name, entry.container_id)
        };
        let message = if entry.ok {
            entry.message.normal()
        } else {
            format!("{} [{}]", entry.message, entry.stage).bright_red()
        };
        println!("  {} {:<16} {:<40} {}", mark, entry.node_name, name, message);
    }

    println!();
    let summary = ledger.summary();
    if ledger.has_failures() || ledger.is_cancelled() {
        println!("  {} {}", "Summary:".bright_white(), summary.bright_yellow());
    } else {
        println!("  {} {}", "Summary:".bright_white(), summary.bright_green());
    }
    println!();
}

/// Ask the operator for a yes/no answer on stdin
pub fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{} ", format!("{} (y/n):", question).bright_white().bold());
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    let response = response.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

/// Token cancelled on the first Ctrl-C; must be called inside a runtime
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Received Ctrl+C, stopping after the current item");
                child.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
        }
    });
    token
}

/// Turn a ledger with failures into a non-zero exit
pub fn ledger_outcome(ledger: &ResultLedger) -> anyhow::Result<()> {
    if ledger.has_failures() {
        anyhow::bail!("{}", ledger.summary());
    }
    if ledger.is_cancelled() {
        anyhow::bail!("cancelled after {} items", ledger.len());
    }
    Ok(())
}
