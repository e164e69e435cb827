//! Record store trait and SQLite implementation.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::records::{Detail, DetailPayload, NewSummary, Summary};
use super::schema::SCHEMA;
use crate::error::{Error, Result};

/// Keyed persistent store for summaries and their details.
///
/// Both upserts resolve conflicts natively in the storage engine; callers never
/// read-then-write to decide between insert and update.
pub trait RecordStore: Send + Sync {
  /// Insert new rows, update `name` where `url` already exists. All or nothing.
  fn upsert_summaries(&self, rows: &[NewSummary]) -> Result<usize>;

  /// Up to `limit` rows in insertion order.
  fn list_summaries(&self, limit: u32) -> Result<Vec<Summary>>;

  /// Case-insensitive pattern match on name. Lowest id wins on ties.
  fn find_summary_by_name(&self, name: &str) -> Result<Option<Summary>>;

  fn find_detail_by_summary_id(&self, summary_id: i64) -> Result<Option<Detail>>;

  /// Insert or fully replace the detail row for `summary_id`.
  fn upsert_detail(&self, summary_id: i64, payload: &DetailPayload) -> Result<()>;

  fn count_summaries(&self) -> Result<u64>;

  fn count_details(&self) -> Result<u64>;
}

/// SQLite-backed record store.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open or create a store at `path`, creating parent directories as needed.
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| {
        Error::StoreUnavailable(format!(
          "failed to create database directory {}: {}",
          parent.display(),
          e
        ))
      })?;
    }

    Self::from_connection(Connection::open(path)?)
  }

  /// Private in-memory store, discarded on drop.
  pub fn open_in_memory() -> Result<Self> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn.execute_batch(SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
    self
      .conn
      .lock()
      .map_err(|e| Error::StoreUnavailable(format!("lock poisoned: {}", e)))
  }
}

const SUMMARY_COLUMNS: &str = "id, name, url";

const DETAIL_COLUMNS: &str =
  "summary_id, categories, traits, primary_metric, dimension_a, dimension_b, media_url, fetched_at";

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<Summary> {
  Ok(Summary {
    id: row.get(0)?,
    name: row.get(1)?,
    url: row.get(2)?,
  })
}

fn detail_from_row(row: &Row<'_>) -> rusqlite::Result<Detail> {
  let fetched_at: String = row.get(7)?;
  Ok(Detail {
    summary_id: row.get(0)?,
    categories: row.get(1)?,
    traits: row.get(2)?,
    primary_metric: row.get(3)?,
    dimension_a: row.get(4)?,
    dimension_b: row.get(5)?,
    media_url: row.get(6)?,
    fetched_at: parse_datetime(&fetched_at).map_err(|e| {
      rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?,
  })
}

impl RecordStore for SqliteStore {
  fn upsert_summaries(&self, rows: &[NewSummary]) -> Result<usize> {
    if rows.is_empty() {
      return Ok(0);
    }

    let mut conn = self.lock()?;
    let tx = conn.transaction()?;
    {
      let mut stmt = tx.prepare_cached(
        "INSERT INTO summaries (name, name_folded, url) VALUES (?1, ?2, ?3)
         ON CONFLICT(url) DO UPDATE SET
           name = excluded.name,
           name_folded = excluded.name_folded,
           updated_at = datetime('now')",
      )?;
      for row in rows {
        stmt.execute(params![row.name, fold_case(&row.name), row.url])?;
      }
    }
    // Dropping an uncommitted transaction rolls it back.
    tx.commit()?;

    Ok(rows.len())
  }

  fn list_summaries(&self, limit: u32) -> Result<Vec<Summary>> {
    let conn = self.lock()?;
    let mut stmt = conn.prepare_cached(&format!(
      "SELECT {} FROM summaries ORDER BY id ASC LIMIT ?1",
      SUMMARY_COLUMNS
    ))?;

    let rows = stmt
      .query_map(params![limit], summary_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
  }

  fn find_summary_by_name(&self, name: &str) -> Result<Option<Summary>> {
    let conn = self.lock()?;
    let mut stmt = conn.prepare_cached(&format!(
      "SELECT {} FROM summaries WHERE name_folded LIKE ?1 ORDER BY id ASC LIMIT 1",
      SUMMARY_COLUMNS
    ))?;

    Ok(
      stmt
        .query_row(params![fold_case(name)], summary_from_row)
        .optional()?,
    )
  }

  fn find_detail_by_summary_id(&self, summary_id: i64) -> Result<Option<Detail>> {
    let conn = self.lock()?;
    let mut stmt = conn.prepare_cached(&format!(
      "SELECT {} FROM details WHERE summary_id = ?1",
      DETAIL_COLUMNS
    ))?;

    Ok(stmt.query_row(params![summary_id], detail_from_row).optional()?)
  }

  fn upsert_detail(&self, summary_id: i64, payload: &DetailPayload) -> Result<()> {
    let conn = self.lock()?;
    conn.execute(
      "INSERT INTO details
         (summary_id, categories, traits, primary_metric, dimension_a, dimension_b, media_url, fetched_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, datetime('now'))
       ON CONFLICT(summary_id) DO UPDATE SET
         categories = excluded.categories,
         traits = excluded.traits,
         primary_metric = excluded.primary_metric,
         dimension_a = excluded.dimension_a,
         dimension_b = excluded.dimension_b,
         media_url = excluded.media_url,
         fetched_at = excluded.fetched_at",
      params![
        summary_id,
        payload.categories,
        payload.traits,
        payload.primary_metric,
        payload.dimension_a,
        payload.dimension_b,
        payload.media_url,
      ],
    )?;

    Ok(())
  }

  fn count_summaries(&self) -> Result<u64> {
    let conn = self.lock()?;
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM summaries", [], |row| row.get(0))?;
    Ok(n as u64)
  }

  fn count_details(&self) -> Result<u64> {
    let conn = self.lock()?;
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM details", [], |row| row.get(0))?;
    Ok(n as u64)
  }
}

/// SQLite's `LIKE` only folds ASCII, so both sides are lowercased here first.
fn fold_case(name: &str) -> String {
  name.to_lowercase()
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_summary(name: &str, url: &str) -> NewSummary {
    NewSummary {
      name: name.to_string(),
      url: url.to_string(),
    }
  }

  fn seeded() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store
      .upsert_summaries(&[
        new_summary("bulbasaur", "https://example.test/pokemon/1/"),
        new_summary("ivysaur", "https://example.test/pokemon/2/"),
        new_summary("pikachu", "https://example.test/pokemon/25/"),
      ])
      .unwrap();
    store
  }

  fn payload() -> DetailPayload {
    DetailPayload {
      categories: "electric".to_string(),
      traits: "static,lightning-rod".to_string(),
      primary_metric: Some(112),
      dimension_a: Some(4),
      dimension_b: Some(60),
      media_url: Some("https://example.test/sprites/25.png".to_string()),
    }
  }

  #[test]
  fn test_upsert_updates_name_in_place() {
    let store = seeded();
    let before = store.find_summary_by_name("pikachu").unwrap().unwrap();

    store
      .upsert_summaries(&[new_summary("pikachu-renamed", "https://example.test/pokemon/25/")])
      .unwrap();

    assert_eq!(store.count_summaries().unwrap(), 3);
    let after = store.find_summary_by_name("pikachu-renamed").unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert!(store.find_summary_by_name("pikachu").unwrap().is_none());
  }

  #[test]
  fn test_upsert_empty_is_noop() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.upsert_summaries(&[]).unwrap(), 0);
    assert_eq!(store.count_summaries().unwrap(), 0);
  }

  #[test]
  fn test_upsert_batch_rolls_back_on_failure() {
    let store = seeded();
    store
      .lock()
      .unwrap()
      .execute_batch(
        "CREATE TRIGGER reject_missingno BEFORE INSERT ON summaries
         WHEN NEW.name = 'missingno'
         BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
      )
      .unwrap();

    let result = store.upsert_summaries(&[
      new_summary("charmander", "https://example.test/pokemon/4/"),
      new_summary("missingno", "https://example.test/pokemon/0/"),
    ]);

    assert!(matches!(result, Err(Error::Store(_))));
    assert_eq!(store.count_summaries().unwrap(), 3);
    assert!(store.find_summary_by_name("charmander").unwrap().is_none());
  }

  #[test]
  fn test_list_in_insertion_order() {
    let store = seeded();
    let names: Vec<String> = store
      .list_summaries(10)
      .unwrap()
      .into_iter()
      .map(|s| s.name)
      .collect();
    assert_eq!(names, vec!["bulbasaur", "ivysaur", "pikachu"]);

    assert_eq!(store.list_summaries(2).unwrap().len(), 2);
  }

  #[test]
  fn test_find_by_name_is_case_insensitive() {
    let store = seeded();
    let found = store.find_summary_by_name("PIKACHU").unwrap().unwrap();
    assert_eq!(found.name, "pikachu");
    assert_eq!(found.url, "https://example.test/pokemon/25/");
  }

  #[test]
  fn test_find_by_name_folds_non_ascii_case() {
    let store = seeded();
    store
      .upsert_summaries(&[new_summary("flabébé", "https://example.test/pokemon/669/")])
      .unwrap();

    let found = store.find_summary_by_name("FLABÉBÉ").unwrap().unwrap();
    assert_eq!(found.name, "flabébé");
    assert!(store.find_summary_by_name("Flabébé").unwrap().is_some());
    assert!(store.find_summary_by_name("flabebe").unwrap().is_none());
  }

  #[test]
  fn test_rename_refolds_lookup_name() {
    let store = seeded();
    store
      .upsert_summaries(&[new_summary("Émolga", "https://example.test/pokemon/25/")])
      .unwrap();

    let found = store.find_summary_by_name("émolga").unwrap().unwrap();
    assert_eq!(found.url, "https://example.test/pokemon/25/");
    assert!(store.find_summary_by_name("pikachu").unwrap().is_none());
  }

  #[test]
  fn test_find_by_name_tie_breaks_on_lowest_id() {
    let store = seeded();
    store
      .upsert_summaries(&[new_summary("Pikachu", "https://example.test/pokemon/10080/")])
      .unwrap();

    let found = store.find_summary_by_name("pikachu").unwrap().unwrap();
    assert_eq!(found.url, "https://example.test/pokemon/25/");
  }

  #[test]
  fn test_find_by_name_missing() {
    let store = seeded();
    assert!(store.find_summary_by_name("doesnotexist").unwrap().is_none());
  }

  #[test]
  fn test_upsert_detail_replaces_all_fields() {
    let store = seeded();
    let pikachu = store.find_summary_by_name("pikachu").unwrap().unwrap();
    assert!(store.find_detail_by_summary_id(pikachu.id).unwrap().is_none());

    store.upsert_detail(pikachu.id, &payload()).unwrap();
    let first = store.find_detail_by_summary_id(pikachu.id).unwrap().unwrap();
    assert_eq!(first.categories, "electric");
    assert_eq!(first.primary_metric, Some(112));

    store
      .upsert_detail(pikachu.id, &DetailPayload::default())
      .unwrap();
    let second = store.find_detail_by_summary_id(pikachu.id).unwrap().unwrap();
    assert_eq!(second.categories, "");
    assert_eq!(second.traits, "");
    assert_eq!(second.primary_metric, None);
    assert_eq!(second.media_url, None);
    assert_eq!(store.count_details().unwrap(), 1);
  }

  #[test]
  fn test_upsert_detail_requires_summary() {
    let store = seeded();
    let result = store.upsert_detail(9999, &payload());
    assert!(matches!(result, Err(Error::Store(_))));
    assert_eq!(store.count_details().unwrap(), 0);
  }

  #[test]
  fn test_file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("catalog.db");

    {
      let store = SqliteStore::open(&path).unwrap();
      store
        .upsert_summaries(&[new_summary("eevee", "https://example.test/pokemon/133/")])
        .unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.count_summaries().unwrap(), 1);
    assert!(store.find_summary_by_name("Eevee").unwrap().is_some());
  }

  #[test]
  fn test_parse_datetime() {
    let dt = parse_datetime("2024-05-01 12:30:00").unwrap();
    assert_eq!(dt.to_rfc3339(), "2024-05-01T12:30:00+00:00");
  }
}
