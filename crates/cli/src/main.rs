//! Tandem CLI, the main entry point.
//!
//! Commands:
//! - `init`         Write a default config file
//! - `ask`          Answer a question, optionally learning from feedback
//! - `memory show`  Print the memory records a role would recall

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "tandem",
    about = "Tandem: a planner/executor agent that learns from feedback",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (default: ~/.tandem/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Ask the agent a question
    Ask(commands::ask::AskArgs),

    /// Inspect the memory log
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Show the records `ask` would recall for a role
    Show {
        /// Agent role (default: agent.role from config)
        #[arg(short, long)]
        role: Option<String>,

        /// How many recent records to show (default: memory.recent_k)
        #[arg(short = 'k', long)]
        recent_k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config_path = cli.config.unwrap_or_else(commands::default_config_path);

    match cli.command {
        Commands::Init { force } => commands::init::run(&config_path, force)?,
        Commands::Ask(args) => {
            let config = commands::load_config(&config_path)?;
            commands::ask::run(&config, args).await?
        }
        Commands::Memory { action } => {
            let config = commands::load_config(&config_path)?;
            match action {
                MemoryAction::Show { role, recent_k } => {
                    commands::memory::show(&config, role, recent_k).await?
                }
            }
        }
    }

    Ok(())
}
