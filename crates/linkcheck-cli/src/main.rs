mod check;
mod offline;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use check::CheckArgs;

#[derive(Debug, Parser)]
#[command(name = "linkcheck")]
#[command(about = "Check LinkedIn connection statuses for profiles listed in a Google Sheet")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check every profile in the sheet and write statuses back
    Check(CheckArgs),
    /// Classify a page-signal JSON object without a browser
    Classify {
        /// `PageSignals` JSON, e.g. '{"hasConnectButton":true}'
        #[arg(long)]
        signals: String,
    },
    /// Print the canonical form of one or more profile URLs
    Normalize {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => {
            let config = linkcheck_core::load_app_config()?;
            init_tracing(&config.log_level);
            check::run_check(&config, &args).await
        }
        Commands::Classify { signals } => {
            init_tracing("warn");
            offline::run_classify(&signals)
        }
        Commands::Normalize { urls } => {
            init_tracing("warn");
            offline::run_normalize(&urls);
            Ok(())
        }
    }
}
