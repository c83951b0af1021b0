mod commands;

use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Types
// ============================================================================

/// Foundernet - networking backend for startup founders: profiles, events, and
/// realtime direct messaging
#[derive(Parser, Debug)]
#[command(version = foundernet::build_info::VERSION, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "foundernet.yaml")]
        config: String,

        /// Host to bind to (overrides config file)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on (overrides config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Data directory (overrides config file). If relative, it is resolved
        /// relative to the config file directory.
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Populate the data directory with a demo dataset
    Seed {
        /// Path to configuration file
        #[arg(short, long, default_value = "foundernet.yaml")]
        config: String,

        /// Data directory (overrides config file)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Seed even if the data directory is not empty
        #[arg(long)]
        force: bool,
    },
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => commands::serve::run(&config, host, port, data_dir.as_deref()).await,
        Commands::Seed {
            config,
            data_dir,
            force,
        } => commands::seed::run(&config, data_dir.as_deref(), force).await,
    }
}

// ============================================================================
// Initialization
// ============================================================================

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
