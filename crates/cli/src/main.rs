//! vahed CLI, the main entry point.
//!
//! Commands:
//! - `serve`    Start the HTTP gateway
//! - `ask`      Run one advisor request from a JSON file
//! - `programs` List curriculum programs
//! - `doctor`   Diagnose configuration and corpus files

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vahed_config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "vahed",
    about = "vahed: course-registration advisor",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config.toml (defaults to ~/.vahed/config.toml)
    #[arg(short, long, global = true, env = "VAHED_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Recommend courses for one request
    Ask {
        /// JSON request file, or `-` for stdin
        #[arg(short, long)]
        request: PathBuf,

        /// Also print the stage-1 candidate list
        #[arg(long)]
        show_candidates: bool,
    },

    /// List the programs in the curriculum file
    Programs,

    /// Diagnose configuration and corpus files
    Doctor,
}

fn config_path(cli_path: Option<PathBuf>) -> PathBuf {
    cli_path.unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let path = config_path(cli.config);
    tracing::debug!(config = %path.display(), "Using config file");

    match cli.command {
        Commands::Serve { port } => commands::serve::run(&path, port).await?,
        Commands::Ask {
            request,
            show_candidates,
        } => commands::ask::run(&path, &request, show_candidates).await?,
        Commands::Programs => commands::programs::run(&path).await?,
        Commands::Doctor => commands::doctor::run(&path).await?,
    }

    Ok(())
}
