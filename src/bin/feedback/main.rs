//! Anonymous Feedback CLI
//!
//! Interactive front end for the feedback desk.

mod commands;
mod style;
mod wizard;

use std::path::PathBuf;

use anon_feedback::Config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use style::*;
use tracing_subscriber::EnvFilter;

const BANNER: &str = r#"
  ███████╗███████╗███████╗██████╗ ██████╗  █████╗  ██████╗██╗  ██╗
  ██╔════╝██╔════╝██╔════╝██╔══██╗██╔══██╗██╔══██╗██╔════╝██║ ██╔╝
  █████╗  █████╗  █████╗  ██║  ██║██████╔╝███████║██║     █████╔╝
  ██╔══╝  ██╔══╝  ██╔══╝  ██║  ██║██╔══██╗██╔══██║██║     ██╔═██╗
  ██║     ███████╗███████╗██████╔╝██████╔╝██║  ██║╚██████╗██║  ██╗
  ╚═╝     ╚══════╝╚══════╝╚═════╝ ╚═════╝ ╚═╝  ╚═╝ ╚═════╝╚═╝  ╚═╝
"#;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "feedback")]
#[command(version)]
#[command(about = "Anonymous employee feedback - complaints, suggestions and praise", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to config.toml
    #[arg(short, long, env = "FEEDBACK_CONFIG", default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session: login or register, then work with tickets (default)
    #[command(visible_alias = "sh")]
    Shell,

    /// Show the level band for a points total
    Levels {
        /// Points total
        points: u32,
    },

    /// List intake departments per ticket type
    #[command(visible_alias = "deps")]
    Departments,

    /// View the leaderboard of the demo directory
    #[command(visible_alias = "lb")]
    Leaderboard {
        /// Number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show effective configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load_from(&cli.config)?;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            print_banner();
            wizard::shell::run(config)
        }
        Commands::Levels { points } => commands::levels::run(&config, points),
        Commands::Departments => commands::departments::run(),
        Commands::Leaderboard { limit } => commands::leaderboard::run(config, limit),
        Commands::Config => commands::config::run(&config),
    }
}

pub fn print_banner() {
    println!("{}", style_cyan(BANNER));
    println!(
        "  {} {}",
        style_dim("Anonymous Feedback"),
        style_dim(&format!("v{}", VERSION))
    );
    println!();
}
