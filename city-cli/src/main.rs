//! # listy-city
//!
//! Terminal front-end for the Listy City list.
//!
//! ## Commands
//!
//! - `list`: Show every city
//! - `add`: Add a city
//! - `show`: Show one city
//! - `update`: Change a city's name or province
//! - `delete`: Delete a city
//!
//! ## Example
//!
//! ```bash
//! # Add a city
//! listy-city add --name Regina --province Saskatchewan
//!
//! # Show the list
//! listy-city list
//!
//! # Fix a province
//! listy-city update <ID> --province SK
//!
//! # Delete without the confirmation prompt
//! listy-city delete <ID> --yes
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod session;

use commands::{add, delete, list, show, update};
use config::{Config, CONFIG_FILE};
use session::Session;

/// Terminal front-end for the Listy City list.
#[derive(Parser, Debug)]
#[command(name = "listy-city")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory holding the store and config file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/listy-city.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show every city
    List,

    /// Add a city
    Add {
        /// City name
        #[arg(long, short)]
        name: String,

        /// Province name
        #[arg(long, short)]
        province: String,
    },

    /// Show one city
    Show {
        /// Document id
        id: String,
    },

    /// Change a city's name or province
    Update {
        /// Document id
        id: String,

        /// New city name
        #[arg(long, short)]
        name: Option<String>,

        /// New province name
        #[arg(long, short)]
        province: Option<String>,
    },

    /// Delete a city
    Delete {
        /// Document id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;

    let config_path = cli.config.unwrap_or_else(|| data_dir.join(CONFIG_FILE));
    let config = Config::load(&config_path).await?;
    init_logging(&config);

    let mut session = Session::open(&config, &data_dir).await?;

    let result = match cli.command {
        Commands::List => list::run(&session),
        Commands::Add { name, province } => add::run(&mut session, &name, &province).await,
        Commands::Show { id } => show::run(&session, &id),
        Commands::Update { id, name, province } => {
            update::run(&mut session, &id, name.as_deref(), province.as_deref()).await
        }
        Commands::Delete { id, yes } => {
            let stdin = std::io::stdin();
            delete::run(&mut session, &id, yes, &mut stdin.lock()).await
        }
    };

    session.close();
    result
}

/// Install the tracing subscriber. `RUST_LOG` wins over the config file.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default data directory for listy-city.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "listy", "listy-city")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
