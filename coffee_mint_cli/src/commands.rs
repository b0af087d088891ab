use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "coffee_mint")]
#[command(about = "Mint a Coffee Punk from the command line")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "COFFEE_MINT_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mint one item with the configured wallet
    Mint {
        /// Confirmation timeout; defaults to tx_timeout_ms from the config
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Wait for an already submitted mint transaction to settle
    Status {
        signature: String,
        /// Confirmation timeout; defaults to tx_timeout_ms from the config
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Load and validate the configuration
    Validate,
    /// Print the configuration with secrets redacted
    Show,
}
