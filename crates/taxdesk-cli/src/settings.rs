//! Runtime settings and database-path resolution.

use std::{
  io::{BufRead, Write},
  path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::prompt::Prompter;

const DATABASE_PROMPT: &str =
  "Enter the database path or leave empty to use DATABASE_URL from .env: ";

/// Settings read from the optional TOML file, overridden by `TAXDESK_*`
/// environment variables.
#[derive(Debug, Deserialize)]
pub struct Settings {
  /// SQLite file to open. Asked for interactively when unset.
  #[serde(default)]
  pub database_path:    Option<PathBuf>,
  /// IANA timezone used when printing filing times.
  #[serde(default = "default_timezone")]
  pub display_timezone: String,
}

fn default_timezone() -> String { "US/Eastern".to_string() }

impl Settings {
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("TAXDESK"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn timezone(&self) -> Result<Tz> {
    self
      .display_timezone
      .parse::<Tz>()
      .map_err(|e| anyhow::anyhow!("unknown timezone {:?}: {e}", self.display_timezone))
  }
}

/// Turn a `DATABASE_URL`-style value into a filesystem path. Accepts bare
/// paths as well as `sqlite://` and `sqlite:` prefixes.
pub fn database_path_from_url(url: &str) -> PathBuf {
  let trimmed = url.trim();
  let path = trimmed
    .strip_prefix("sqlite://")
    .or_else(|| trimmed.strip_prefix("sqlite:"))
    .unwrap_or(trimmed);
  PathBuf::from(path)
}

/// Ask for the database path; an empty answer falls back to `DATABASE_URL`.
pub fn prompt_database_path<R: BufRead, W: Write>(io: &mut Prompter<R, W>) -> Result<PathBuf> {
  let answer = io.line(DATABASE_PROMPT)?;
  if !answer.is_empty() {
    return Ok(database_path_from_url(&answer));
  }
  let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
  Ok(database_path_from_url(&url))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_prefixes_are_stripped() {
    assert_eq!(database_path_from_url("taxes.db"), PathBuf::from("taxes.db"));
    assert_eq!(database_path_from_url("sqlite://data/taxes.db"), PathBuf::from("data/taxes.db"));
    assert_eq!(database_path_from_url("sqlite:taxes.db"), PathBuf::from("taxes.db"));
    assert_eq!(database_path_from_url(" /tmp/t.db \n"), PathBuf::from("/tmp/t.db"));
  }

  #[test]
  fn typed_path_wins_over_environment() {
    let mut io = Prompter::new("office.db\n".as_bytes(), std::io::sink());
    assert_eq!(prompt_database_path(&mut io).unwrap(), PathBuf::from("office.db"));
  }

  #[test]
  fn default_timezone_parses() {
    let settings = Settings { database_path: None, display_timezone: default_timezone() };
    assert_eq!(settings.timezone().unwrap(), chrono_tz::US::Eastern);

    let bad = Settings { database_path: None, display_timezone: "Mars/Olympus".into() };
    assert!(bad.timezone().is_err());
  }
}
