//! Coordinator that moves data between the remote source and the record store.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::Hydrated;
use crate::error::{Error, Result};
use crate::source::SourceGateway;
use crate::store::{Detail, RecordStore, Summary};

/// Batch ingestion and on-demand detail hydration.
///
/// Holds no state of its own beyond the injected handles: every hydration
/// check re-reads the store, so concurrent callers always see what is
/// persisted rather than a per-process copy.
pub struct SyncCoordinator<S, G> {
  store: Arc<S>,
  gateway: Arc<G>,
}

impl<S, G> SyncCoordinator<S, G>
where
  S: RecordStore + 'static,
  G: SourceGateway + 'static,
{
  pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
    Self { store, gateway }
  }

  /// Run a store operation on the blocking pool.
  pub async fn with_store<T, F>(&self, op: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&S) -> Result<T> + Send + 'static,
  {
    let store = Arc::clone(&self.store);
    tokio::task::spawn_blocking(move || op(store.as_ref())).await?
  }

  /// Fetch one listing page and upsert it.
  ///
  /// A fetch failure returns before anything is written; a write failure rolls
  /// the whole batch back.
  #[instrument(skip(self))]
  pub async fn ingest(&self, limit: u32, offset: u32) -> Result<usize> {
    let rows = self.gateway.fetch_batch(limit, offset).await?;
    let count = self
      .with_store(move |store| store.upsert_summaries(&rows))
      .await?;

    info!(count, "ingested listing page");
    Ok(count)
  }

  /// Return the stored detail for `summary`, fetching and storing it on a miss.
  #[instrument(skip(self, summary), fields(summary_id = summary.id, name = %summary.name))]
  pub async fn hydrate_detail(&self, summary: &Summary) -> Result<Hydrated<Detail>> {
    let summary_id = summary.id;
    if let Some(detail) = self
      .with_store(move |store| store.find_detail_by_summary_id(summary_id))
      .await?
    {
      debug!("detail cache hit");
      return Ok(Hydrated::from_store(detail));
    }

    debug!("detail cache miss, fetching from source");
    self.fetch_and_store(summary).await
  }

  /// Re-hydrate unconditionally, overwriting any stored detail.
  #[instrument(skip(self, summary), fields(summary_id = summary.id, name = %summary.name))]
  pub async fn refresh_detail(&self, summary: &Summary) -> Result<Hydrated<Detail>> {
    self.fetch_and_store(summary).await
  }

  async fn fetch_and_store(&self, summary: &Summary) -> Result<Hydrated<Detail>> {
    let payload = self
      .gateway
      .fetch_detail(&summary.url)
      .await
      .inspect_err(|e| warn!(error = %e, "detail fetch failed, nothing stored"))?;

    let summary_id = summary.id;
    // Read back after writing so callers get the store's canonical shape.
    let stored = self
      .with_store(move |store| {
        store.upsert_detail(summary_id, &payload)?;
        store.find_detail_by_summary_id(summary_id)
      })
      .await?
      .ok_or_else(|| Error::NotFound(format!("detail for summary {}", summary_id)))?;

    Ok(Hydrated::from_remote(stored))
  }
}

impl<S, G> Clone for SyncCoordinator<S, G> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      gateway: Arc::clone(&self.gateway),
    }
  }
}
