//! TierForge CLI - Build, rank and share product tier lists.

use clap::Parser;
use tierforge_cli::commands;
use tierforge_cli::{Cli, Command, Config, Formatter};
use tierforge_store::SqliteStore;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> tierforge_cli::Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let mut config = Config::load(&config_path)?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let database = config.database(cli.database.as_deref())?;
    if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut store = SqliteStore::new(&database)?;
    tracing::debug!(database = %database.display(), config = %config_path.display(), "Starting");

    match cli.command {
        Command::Signup(args) => {
            commands::execute_signup(args, &mut store, &mut config, &config_path, &formatter)?;
        }
        Command::Whoami => commands::execute_whoami(&store, &config, &formatter)?,
        Command::Usage => commands::execute_usage(&store, &config, &formatter)?,
        Command::Plan(args) => commands::execute_plan(args, &mut store, &config, &formatter)?,
        Command::Analytics => commands::execute_analytics(&store, &config, &formatter)?,
        Command::Category(args) => {
            commands::execute_category(args, &mut store, &config, &formatter)?;
        }
        Command::Param(args) => commands::execute_param(args, &mut store, &config, &formatter)?,
        Command::Product(args) => {
            commands::execute_product(args, &mut store, &config, &formatter)?;
        }
        Command::TierList(args) => {
            commands::execute_tier_list(args, &mut store, &config, &formatter)?;
        }
    }

    Ok(())
}
