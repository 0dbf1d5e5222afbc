//! Minecraft server manager CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mcserver_manager::commands::{self, CliError, ListAction, PropsAction};
use mcserver_manager::config::{ConfigLoader, ManagerConfig};
use mcserver_manager::display;
use mcserver_manager::players::MojangResolver;

#[derive(Parser)]
#[command(
    name = "mcserver-manager",
    about = "Supervise a Minecraft server from the terminal",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file to use instead of the default search paths.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server directory, overriding the config file.
    #[arg(short = 'd', long)]
    server_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server and attach an interactive console.
    Run,
    /// View or edit server.properties.
    Props {
        #[command(subcommand)]
        action: PropsCommand,
    },
    /// View or edit the whitelist.
    Whitelist {
        #[command(subcommand)]
        action: ListCommand,
    },
    /// View or edit the ban list.
    Ban {
        #[command(subcommand)]
        action: ListCommand,
        /// Reason recorded with a new ban.
        #[arg(short, long, global = true)]
        reason: Option<String>,
    },
}

#[derive(Subcommand)]
enum PropsCommand {
    /// Print every property.
    List,
    /// Print one property.
    Get { key: String },
    /// Set a property, keeping comments and order.
    Set { key: String, value: String },
    /// Remove a property from the file.
    Unset { key: String },
}

impl From<PropsCommand> for PropsAction {
    fn from(cmd: PropsCommand) -> Self {
        match cmd {
            PropsCommand::List => Self::List,
            PropsCommand::Get { key } => Self::Get { key },
            PropsCommand::Set { key, value } => Self::Set { key, value },
            PropsCommand::Unset { key } => Self::Unset { key },
        }
    }
}

#[derive(Subcommand)]
enum ListCommand {
    /// Print the list.
    List,
    /// Add a player by name.
    Add { name: String },
    /// Remove a player by name.
    Remove { name: String },
}

impl From<ListCommand> for ListAction {
    fn from(cmd: ListCommand) -> Self {
        match cmd {
            ListCommand::List => Self::List,
            ListCommand::Add { name } => Self::Add { name },
            ListCommand::Remove { name } => Self::Remove { name },
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<ManagerConfig, CliError> {
    let loader = cli
        .config
        .clone()
        .map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let mut config = loader.load()?;
    if let Some(dir) = &cli.server_dir {
        config.server.server_dir.clone_from(dir);
    }
    Ok(config)
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let server_dir = config.server.server_dir.clone();

    match cli.command {
        Commands::Run => {
            tracing::info!(dir = %server_dir.display(), "Starting console");
            commands::run_console(config).await;
        }
        Commands::Props { action } => commands::run_props(&server_dir, action.into())?,
        Commands::Whitelist { action } => {
            let resolver = MojangResolver::new()?;
            commands::run_whitelist(&server_dir, &resolver, action.into()).await?;
        }
        Commands::Ban { action, reason } => {
            let resolver = MojangResolver::new()?;
            commands::run_ban(&server_dir, &resolver, action.into(), reason.as_deref()).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
