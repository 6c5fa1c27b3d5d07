use clap::Args;
use colored::Colorize;
use docklet_orchestrator::{BulkAction, BulkRequest};
use docklet_types::RedeployOverrides;

use super::{
    cancel_on_ctrl_c, confirm, ledger_outcome, print_header, print_ledger, print_matches,
    ConnectionArgs, TargetArgs,
};

/// Scan, then apply one action to every match
#[derive(Args)]
pub struct RunCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub target: TargetArgs,

    /// start, stop, delete or redeploy
    #[arg(long, short = 'a')]
    pub action: BulkAction,

    /// Redeploy: replacement image
    #[arg(long)]
    pub image: Option<String>,

    /// Redeploy: new container name, supports {node} and {name}
    #[arg(long)]
    pub name_template: Option<String>,

    /// Redeploy: KEY=VALUE replacing the container's environment (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Redeploy: HOST:CONTAINER replacing the published ports (repeatable)
    #[arg(long = "port", value_name = "HOST:CONTAINER")]
    pub ports: Vec<String>,

    /// Redeploy: create the new container without auto-restart
    #[arg(long)]
    pub no_auto_restart: bool,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl RunCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }

    fn overrides(&self) -> Option<RedeployOverrides> {
        if self.action != BulkAction::Redeploy {
            return None;
        }
        let lines = |values: &[String]| (!values.is_empty()).then(|| values.join("\n"));
        Some(RedeployOverrides {
            image: self.image.clone(),
            name_template: self.name_template.clone(),
            env_text: lines(self.env.as_slice()),
            ports_text: lines(self.ports.as_slice()),
            auto_restart: !self.no_auto_restart,
        })
    }

    async fn run(self) -> anyhow::Result<()> {
        let orchestrator = self.connection.orchestrator()?;
        let nodes = orchestrator.select_nodes(&self.target.selection()).await?;
        let matches = orchestrator
            .scanner()
            .scan(&nodes, &self.target.filter)
            .await?;

        print_header(&format!("Bulk {}", self.action));
        print_matches(&matches);
        if matches.is_empty() {
            return Ok(());
        }

        if !self.yes {
            let question = if self.action.is_destructive() {
                format!(
                    "{} {} containers? This cannot be undone.",
                    self.action,
                    matches.len()
                )
            } else {
                format!("{} {} containers?", self.action, matches.len())
            };
            if !confirm(&question)? {
                println!();
                println!("{}", "Cancelled.".bright_yellow());
                println!();
                return Ok(());
            }
            println!();
        }

        let request = BulkRequest {
            overrides: self.overrides(),
            matches,
            action: self.action,
        };
        let cancel = cancel_on_ctrl_c();
        let ledger = orchestrator.executor().run(request, &cancel).await?;

        print_ledger(&ledger);
        ledger_outcome(&ledger)
    }
}
