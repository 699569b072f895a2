//! `taxdesk` — menu-driven record keeper for a tax office.
//!
//! # Usage
//!
//! ```
//! taxdesk --database office.db
//! taxdesk --config ~/.config/taxdesk/taxdesk.toml
//! ```

mod prompt;
mod settings;
mod shell;

use std::{io, path::PathBuf};

use anyhow::{Context as _, Result};
use clap::Parser;
use taxdesk_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  prompt::Prompter,
  settings::{Settings, prompt_database_path},
  shell::Shell,
};

#[derive(Parser, Debug)]
#[command(name = "taxdesk", version, about = "Track tax-office clients, staff and returns")]
struct Args {
  /// Path to a TOML config file (database_path, display_timezone).
  #[arg(short, long, value_name = "FILE", default_value = "taxdesk.toml")]
  config: PathBuf,

  /// SQLite database file; overrides the config file.
  #[arg(short, long, value_name = "PATH")]
  database: Option<PathBuf>,

  /// Log at debug level unless RUST_LOG says otherwise.
  #[arg(short, long)]
  verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Logs go to stderr so they never interleave with the menu.
  let default_level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy(),
    )
    .init();

  dotenvy::dotenv().ok();

  let settings = Settings::load(&args.config)?;
  let timezone = settings.timezone()?;

  let mut input = io::stdin().lock();
  let mut output = io::stdout();

  // CLI flag, then config, then ask.
  let database_path = match args.database.or(settings.database_path) {
    Some(path) => path,
    None => prompt_database_path(&mut Prompter::new(&mut input, &mut output))?,
  };

  let store = SqliteStore::open(&database_path)
    .await
    .with_context(|| format!("failed to open store at {}", database_path.display()))?;
  tracing::info!(path = %database_path.display(), "store opened");

  Shell::new(&store, &mut input, &mut output, timezone).run().await
}
