use clap::Args;
use colored::Colorize;

use super::{print_header, ConnectionArgs};

/// List nodes known to the control plane
#[derive(Args)]
pub struct NodesCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Print the registry as JSON
    #[arg(long)]
    pub json: bool,
}

impl NodesCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        let orchestrator = self.connection.orchestrator()?;
        let nodes = orchestrator.nodes().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&nodes)?);
            return Ok(());
        }

        print_header("Nodes");

        if nodes.is_empty() {
            println!("  {} No nodes registered.", "ℹ".bright_blue());
            println!();
            return Ok(());
        }

        println!(
            "  {:<20} {:<38} {:<14} {:<24} {:<10}",
            "NAME".bright_white().bold(),
            "ID".bright_white().bold(),
            "STATUS".bright_white().bold(),
            "ADDRESS".bright_white().bold(),
            "VERSION".bright_white().bold()
        );
        println!("  {}", "─".repeat(110));

        for node in &nodes {
            let status = if node.is_connected() {
                node.status.as_str().bright_green()
            } else {
                node.status.as_str().bright_red()
            };
            println!(
                "  {:<20} {:<38} {:<14} {:<24} {:<10}",
                node.display_name().bright_cyan(),
                node.id,
                status,
                if node.address.is_empty() { "-" } else { node.address.as_str() },
                node.version.as_deref().unwrap_or("-")
            );
        }

        let connected = nodes.iter().filter(|node| node.is_connected()).count();
        println!();
        println!(
            "  {} {} of {} connected",
            "→".bright_blue(),
            connected,
            nodes.len()
        );
        println!();
        Ok(())
    }
}
