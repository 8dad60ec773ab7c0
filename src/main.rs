//! Terminalik CLI binary entry point.

use std::path::Path;

use tracing_subscriber::EnvFilter;

use terminalik::cli::{AuthCommands, Cli, Commands, ConfigCommands};
use terminalik::config::TerminalikConfig;
use terminalik::error::TerminalikError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        // The login flow has already printed its own failure line.
        if !matches!(e, TerminalikError::Auth(_)) {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> terminalik::error::Result<()> {
    let config = TerminalikConfig::load(cli.config.as_deref())?;
    let config_path = cli.config.or_else(TerminalikConfig::default_path);
    match cli.command {
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Login(args) => {
                terminalik::cli::auth::handle_login(&args, &config).await?;
                Ok(())
            }
        },
        Commands::Config(config_args) => match config_args.command {
            ConfigCommands::Show => handle_config_show(config_path.as_deref(), &config),
        },
    }
}

fn handle_config_show(
    path: Option<&Path>,
    config: &TerminalikConfig,
) -> terminalik::error::Result<()> {
    match path {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no config directory available"),
    }
    print!("{}", config.to_toml()?);

    let resolved = config.auth_config();
    println!();
    println!("# resolved");
    println!("# client_id = {}", resolved.client_id);
    println!("# scope = {:?}", resolved.scope);
    println!("# request_timeout_secs = {}", resolved.request_timeout.as_secs());
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "terminalik=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
