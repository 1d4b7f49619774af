use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ConfigLoader, CONFIG_ENV, DATA_ENV};

pub mod commands;

use self::commands::{SearchArgs, ThemeArgs};

#[derive(Parser, Debug)]
#[command(
    name = "notes-store",
    version,
    about = "Drive the notes store against its in-memory mock backend"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over NOTES_STORE_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over NOTES_STORE_DATA)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and print every note (default)
    List,
    /// Print notes whose title or content contains the query
    Search(SearchArgs),
    /// Show or change the persisted light/dark preference
    Theme(ThemeArgs),
    /// Run a create/update/delete round trip and print each published state
    Demo,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var(CONFIG_ENV, path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var(DATA_ENV, path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    let paths = loader.paths().clone();
    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let config = loader.load_or_init()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("building async runtime")?;

    let command = cli.command.unwrap_or(Commands::List);
    match command {
        Commands::List => runtime.block_on(commands::list_notes(&config)),
        Commands::Search(args) => runtime.block_on(commands::search_notes(&config, args)),
        Commands::Theme(args) => commands::handle_theme_command(&config, &paths, args),
        Commands::Demo => runtime.block_on(commands::demo(&config)),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(())
    })
    .map(|_| ())
}
