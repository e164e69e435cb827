//! Persistent storage for catalog summaries and lazily hydrated details.
//!
//! Two tables, each with a natural unique key that upserts resolve against:
//! - `summaries`, keyed on `url`
//! - `details`, keyed on `summary_id` (one-to-one with `summaries`)

mod records;
mod schema;
mod sqlite;

pub use records::{join_list, Detail, DetailPayload, NewSummary, Summary};
pub use sqlite::{RecordStore, SqliteStore};

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;

/// Get the default database path
pub fn default_path() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("dexcache").join("catalog.db"))
}
