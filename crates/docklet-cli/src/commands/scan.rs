use clap::Args;
use colored::Colorize;

use super::{print_header, print_matches, ConnectionArgs, TargetArgs};

/// Find containers across nodes
#[derive(Args)]
pub struct ScanCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Keep matches from healthy nodes when some nodes fail
    #[arg(long)]
    pub best_effort: bool,
}

impl ScanCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        let orchestrator = self.connection.orchestrator()?;
        let nodes = orchestrator.select_nodes(&self.target.selection()).await?;

        print_header("Container Scan");
        println!(
            "{} Scanning {} nodes for {:?}",
            "→".bright_blue(),
            nodes.len(),
            self.target.filter.trim()
        );
        println!();

        if !self.best_effort {
            let matches = orchestrator
                .scanner()
                .scan(&nodes, &self.target.filter)
                .await?;
            print_matches(&matches);
            return Ok(());
        }

        let report = orchestrator
            .scanner()
            .scan_best_effort(&nodes, &self.target.filter)
            .await?;
        print_matches(&report.matches);

        for failure in &report.failures {
            println!(
                "  {} {} ({}): {}",
                "✗".bright_red(),
                failure.node_name.bright_cyan(),
                failure.node_id,
                failure.message
            );
        }
        if !report.is_complete() {
            println!();
            anyhow::bail!(
                "{} of {} nodes could not be scanned",
                report.failures.len(),
                nodes.len()
            );
        }
        Ok(())
    }
}
