use clap::Args;
use colored::Colorize;

use super::ConnectionArgs;

/// Count the containers a migration from a node would process
#[derive(Args)]
pub struct CountCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Source node id
    #[arg(long, value_name = "ID")]
    pub node: String,
}

impl CountCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let orchestrator = self.connection.orchestrator()?;
            let count = orchestrator
                .migration()
                .count_source_containers(&self.node)
                .await?;
            println!(
                "{} {} containers on {}",
                "→".bright_blue(),
                count.to_string().bright_white().bold(),
                self.node.bright_cyan()
            );
            Ok(())
        })
    }
}
