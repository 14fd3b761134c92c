//! Rapport CLI - Command-line interface for managing relationships between identities.

use clap::Parser;
use rapport_cli::commands::{self, Transition};
use rapport_cli::{Cli, Command, Config, Formatter};
use rapport_manager::RelationshipMetrics;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> rapport_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load config, falling back to defaults when the file is absent
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    let config = Config::load_from(&config_path)?;

    // Log to stderr; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.settings.log_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    if let Command::Config(args) = cli.command {
        return commands::execute_config(args, &config, &config_path, &formatter);
    }

    let database = config.database_path(cli.database.as_deref())?;
    debug!(database = %database.display(), "Opening database");

    if let Command::Identity(args) = cli.command {
        let mut store = commands::open_store(&database)?;
        return commands::execute_identity(args, &mut store, &formatter);
    }

    let mut manager = commands::open_manager(&database, config.manager.clone())?;
    let metrics = Arc::new(RelationshipMetrics::new());
    manager.register_listener(metrics.clone());

    match cli.command {
        Command::Invite(args) => commands::execute_invite(args, &mut manager, &formatter)?,
        Command::Confirm(args) => {
            commands::execute_transition(Transition::Confirm, args, &mut manager, &formatter)?
        }
        Command::Deny(args) => {
            commands::execute_transition(Transition::Deny, args, &mut manager, &formatter)?
        }
        Command::Remove(args) => {
            commands::execute_transition(Transition::Remove, args, &mut manager, &formatter)?
        }
        Command::Ignore(args) => {
            commands::execute_transition(Transition::Ignore, args, &mut manager, &formatter)?
        }
        Command::List(args) => commands::execute_list(args, &manager, &formatter)?,
        Command::Status(args) => commands::execute_status(args, &manager, &formatter)?,
        Command::Suggest(args) => commands::execute_suggest(args, &manager, &formatter)?,
        Command::Identity(_) | Command::Config(_) => unreachable!(),
    }

    debug!("{}", metrics.summary());
    Ok(())
}
