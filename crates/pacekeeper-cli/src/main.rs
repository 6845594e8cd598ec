use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod sink;

#[derive(Parser)]
#[command(name = "pacekeeper-cli", version, about = "Pacekeeper CLI")]
struct Cli {
    /// Use this config file instead of ~/.config/pacekeeper/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a recorded sample file through the engine
    Replay(commands::replay::ReplayArgs),
    /// Read samples and commands from stdin with a real 1 Hz tick
    Live(commands::live::LiveArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Interval workout presets
    Workout {
        #[command(subcommand)]
        action: commands::workout::WorkoutAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PACEKEEPER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Replay(args) => commands::replay::run(args, config),
        Commands::Live(args) => commands::live::run(args, config),
        Commands::Config { action } => commands::config::run(action, config),
        Commands::Workout { action } => commands::workout::run(action, config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
