//! dbtchat CLI: the main entry point.
//!
//! Commands:
//! - `init`    : Write a default config file
//! - `serve`   : Start the HTTP gateway
//! - `projects`: List projects in the portal directory
//! - `ask`     : Ask one question about a project
//! - `reduce`  : Print the manifest context a project would send
//! - `status`  : Show effective configuration
//! - `doctor`  : Diagnose setup problems

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(
    name = "dbtchat",
    about = "Chat with your dbt project manifests",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List projects in the portal directory
    Projects,

    /// Ask a single question about a project
    Ask {
        /// Project directory name under the portal
        #[arg(short, long)]
        project: String,

        /// The question
        #[arg(short, long)]
        message: String,

        /// JSON file with prior turns: [{"role": "user", "content": "..."}]
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Print the manifest context that would be sent to the assistant
    Reduce {
        /// Path to a manifest.json
        path: PathBuf,

        /// Override the reduction threshold in bytes
        #[arg(short, long)]
        threshold: Option<usize>,
    },

    /// Show effective configuration
    Status,

    /// Diagnose setup problems
    Doctor,
}

#[tokio::main]
async fn main() -> ExitCode {
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

    // Errors reach the user through Display only.
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Init => commands::init::run().await,
        Commands::Serve { port } => commands::serve::run(port).await,
        Commands::Projects => commands::projects::run().await,
        Commands::Ask {
            project,
            message,
            history,
        } => commands::ask::run(project, message, history).await,
        Commands::Reduce { path, threshold } => commands::reduce::run(path, threshold).await,
        Commands::Status => commands::status::run().await,
        Commands::Doctor => commands::doctor::run().await,
    }
}
