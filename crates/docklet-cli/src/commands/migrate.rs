use clap::Args;
use colored::Colorize;
use docklet_orchestrator::MigrationRequest;

use super::{
    cancel_on_ctrl_c, confirm, ledger_outcome, print_header, print_ledger, ConnectionArgs,
};

/// Copy or move every container from one node to another
#[derive(Args)]
pub struct MigrateCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Source node id
    #[arg(long, value_name = "ID")]
    pub from: String,

    /// Target node id
    #[arg(long, value_name = "ID")]
    pub to: String,

    /// Copy only; leave the source containers in place
    #[arg(long)]
    pub keep_source: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl MigrateCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    async fn run(self) -> anyhow::Result<()> {
        let orchestrator = self.connection.orchestrator()?;
        let mode = if self.keep_source { "Copy" } else { "Move" };
        print_header(&format!("{} containers {} → {}", mode, self.from, self.to));

        let count = orchestrator
            .migration()
            .count_source_containers(&self.from)
            .await?;
        println!(
            "{} {} containers on source node",
            "→".bright_blue(),
            count.to_string().bright_white().bold()
        );
        if !self.keep_source {
            println!(
                "{}",
                "Each source container is removed once its copy exists.".bright_yellow()
            );
            println!(
                "{}",
                "If a removal fails both copies are left running.".bright_yellow()
            );
        }
        println!();

        if !self.yes && !confirm("Are you sure you want to continue?")? {
            println!();
            println!("{}", "Migration cancelled.".bright_yellow());
            println!();
            return Ok(());
        }
        println!();

        let request = MigrationRequest::new(&self.from, &self.to)
            .keep_source(self.keep_source)
            .confirmed();

        let cancel = cancel_on_ctrl_c();
        let ledger = orchestrator.migration().migrate(&request, &cancel).await?;

        print_ledger(&ledger);
        ledger_outcome(&ledger)
    }
}
