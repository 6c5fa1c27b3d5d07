//! docklet-orch - bulk actions and migrations across docklet nodes

mod commands;

use clap::{Parser, Subcommand};
use commands::{CountCommand, MigrateCommand, NodesCommand, RunCommand, ScanCommand};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "DOCKLET_LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(
        long,
        default_value = "compact",
        env = "DOCKLET_LOG_FORMAT",
        global = true
    )]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List nodes known to the control plane
    Nodes(NodesCommand),
    /// Find containers across nodes
    Scan(ScanCommand),
    /// Scan, then start, stop, delete or redeploy every match
    Run(RunCommand),
    /// Copy or move all containers from one node to another
    Migrate(MigrateCommand),
    /// Count the containers a migration from a node would process
    Count(CountCommand),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes full control when set
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .map_err(|e| anyhow::anyhow!("Invalid RUST_LOG environment variable: {}", e))?
    } else {
        tracing_subscriber::EnvFilter::new(format!(
            "docklet_cli={level},\
             docklet_client={level},\
             docklet_config={level},\
             docklet_orchestrator={level},\
             docklet_types={level},\
             h2=warn,\
             hyper=warn,\
             hyper_util=warn,\
             reqwest=warn,\
             rustls=warn",
            level = cli.log_level
        ))
    };

    let fmt_layer = match cli.log_format.as_str() {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global default subscriber: {}", e))?;

    match cli.command {
        Commands::Nodes(cmd) => cmd.execute(),
        Commands::Scan(cmd) => cmd.execute(),
        Commands::Run(cmd) => cmd.execute(),
        Commands::Migrate(cmd) => cmd.execute(),
        Commands::Count(cmd) => cmd.execute(),
    }
}
