mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use iced::{window, Size};
use passgate::{gui, Gate, GateConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "passgate")]
#[command(about = "Password gate for content source selection", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "passgate.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the digest of a password, for the config file
    Hash {
        password: String,
    },

    /// Show gate state and active sources
    Status,

    /// Verify the password from the terminal
    Unlock,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = GateConfig::load_or_default(&cli.config)?;

    match cli.command {
        Some(Commands::Hash { password }) => cli::hash(&config, &password),
        Some(Commands::Status) => cli::status(&config),
        Some(Commands::Unlock) => cli::unlock(&config),
        None => run_gui(&config),
    }
}

fn run_gui(config: &GateConfig) -> Result<()> {
    let gate = Gate::open(config)?;
    iced::application(
        "PassGate",
        gui::PassGateApp::update,
        gui::PassGateApp::view,
    )
    .window(window::Settings {
        size: Size::new(960.0, 640.0),
        resizable: true,
        ..window::Settings::default()
    })
    .run_with(move || gui::PassGateApp::new(gate))?;
    Ok(())
}
