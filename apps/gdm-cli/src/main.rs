#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use graphdb_manager::{GraphDatabase, GraphDatabaseManager, ManagerConfig};

use std::path::PathBuf;
use std::sync::Arc;

/// Discover and inspect the management services of a graph database server
#[derive(Parser)]
#[command(name = "gdm")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server URL (overrides config)
    #[arg(short, long)]
    url: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// List the services the server offers
    Services,
    /// Print the descriptor of one service
    Describe {
        /// Service name as listed by `services`
        name: String,
    },
    /// Validate configuration and exit
    Check,
}

impl Cli {
    fn overrides(&self) -> config::Overrides {
        config::Overrides {
            url: self.url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (GDM__*) -> 4) CLI overrides
    let config = config::load(cli.config.as_deref(), &cli.overrides())?;
    let mut out = std::io::stdout();

    // Dispatch subcommands (default: services)
    match cli.command.unwrap_or(Commands::Services) {
        Commands::Check => commands::check(&config, &mut out),
        Commands::Services => {
            let manager = connect(&config)?;
            commands::services(&manager, &mut out).await
        }
        Commands::Describe { name } => {
            let manager = connect(&config)?;
            commands::describe(&manager, &name, &mut out).await
        }
    }
}

fn connect(config: &ManagerConfig) -> Result<Arc<GraphDatabaseManager>> {
    let db = GraphDatabase::from_config(config)?;
    tracing::debug!(url = db.url(), manage_url = db.manage_url(), "connecting");
    Ok(GraphDatabaseManager::new(Arc::new(db)))
}
