//! CLI entry point for Terminalik.

pub mod auth;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Terminalik CLI
#[derive(Parser, Debug)]
#[command(name = "terminalik", version, about = "Terminalik: GitHub device login")]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication management
    Auth(AuthArgs),
    /// Configuration inspection
    Config(ConfigArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in with GitHub using a device code
    Login(LoginArgs),
}

/// Arguments for `terminalik auth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// OAuth app client id (overrides config and environment)
    #[arg(long)]
    pub client_id: Option<String>,

    /// Requested scopes, space separated (may be empty)
    #[arg(long)]
    pub scope: Option<String>,

    /// Open the verification page in the default browser
    #[arg(long)]
    pub open: bool,
}

/// Arguments for the `config` subcommand group.
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the resolved configuration
    Show,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
