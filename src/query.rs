//! Read-side entry point: list, lookup and detail requests against the store.
//!
//! Details are hydrated through the [`SyncCoordinator`] when absent, so a
//! `detail` call may pay for one remote fetch the first time a name is asked for.

use serde::Serialize;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::source::SourceGateway;
use crate::store::{Detail, RecordStore, Summary};
use crate::sync::SyncCoordinator;

pub const INGEST_LIMIT_RANGE: RangeInclusive<u32> = 1..=200;
pub const LIST_LIMIT_RANGE: RangeInclusive<u32> = 1..=500;
pub const DEFAULT_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryName {
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryLink {
  pub name: String,
  pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
  pub ingested: usize,
  pub limit: u32,
  pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
  pub status: &'static str,
  pub summaries: u64,
  pub details: u64,
}

/// Detail composed for display. Dimensions are converted to display units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
  pub name: String,
  pub categories: String,
  pub traits: String,
  pub primary_metric: Option<i64>,
  #[serde(rename = "dimension_a")]
  pub dimension_a_display: Option<f64>,
  #[serde(rename = "dimension_b")]
  pub dimension_b_display: Option<f64>,
  pub media_url: Option<String>,
}

impl DetailView {
  fn compose(summary: Summary, detail: Detail) -> Self {
    Self {
      name: summary.name,
      categories: detail.categories,
      traits: detail.traits,
      primary_metric: detail.primary_metric,
      dimension_a_display: to_display_units(detail.dimension_a),
      dimension_b_display: to_display_units(detail.dimension_b),
      media_url: detail.media_url,
    }
  }
}

/// Decimetres to metres, hectograms to kilograms.
pub fn to_display_units(raw: Option<i64>) -> Option<f64> {
  raw.map(|v| v as f64 / 10.0)
}

pub struct QueryService<S, G> {
  coordinator: SyncCoordinator<S, G>,
}

impl<S, G> QueryService<S, G>
where
  S: RecordStore + 'static,
  G: SourceGateway + 'static,
{
  pub fn new(store: Arc<S>, gateway: Arc<G>) -> Self {
    Self {
      coordinator: SyncCoordinator::new(store, gateway),
    }
  }

  pub async fn ingest(&self, limit: u32, offset: u32) -> Result<IngestReport> {
    check_range("limit", limit, INGEST_LIMIT_RANGE)?;
    let ingested = self.coordinator.ingest(limit, offset).await?;
    Ok(IngestReport {
      ingested,
      limit,
      offset,
    })
  }

  pub async fn list(&self, limit: u32) -> Result<Vec<SummaryName>> {
    check_range("limit", limit, LIST_LIMIT_RANGE)?;
    let rows = self
      .coordinator
      .with_store(move |store| store.list_summaries(limit))
      .await?;
    Ok(rows.into_iter().map(|s| SummaryName { name: s.name }).collect())
  }

  pub async fn resolve_url(&self, name: &str) -> Result<SummaryLink> {
    let summary = self.lookup(name).await?;
    Ok(SummaryLink {
      name: summary.name,
      url: summary.url,
    })
  }

  pub async fn detail(&self, name: &str) -> Result<DetailView> {
    let summary = self.lookup(name).await?;
    let hydrated = self.coordinator.hydrate_detail(&summary).await?;
    debug!(
      summary_id = hydrated.data.summary_id,
      origin = ?hydrated.origin,
      fetched_at = %hydrated.data.fetched_at,
      "detail served"
    );
    Ok(DetailView::compose(summary, hydrated.into_inner()))
  }

  /// Force a re-fetch of the detail for `name`, replacing what is stored.
  pub async fn refresh_detail(&self, name: &str) -> Result<DetailView> {
    let summary = self.lookup(name).await?;
    let detail = self.coordinator.refresh_detail(&summary).await?.into_inner();
    Ok(DetailView::compose(summary, detail))
  }

  pub async fn health(&self) -> Result<HealthReport> {
    let (summaries, details) = self
      .coordinator
      .with_store(|store| Ok((store.count_summaries()?, store.count_details()?)))
      .await?;
    Ok(HealthReport {
      status: "ok",
      summaries,
      details,
    })
  }

  /// The name is matched as given; surrounding whitespace is part of the pattern.
  async fn lookup(&self, name: &str) -> Result<Summary> {
    if name.is_empty() {
      return Err(Error::InvalidInput("name must not be empty".to_string()));
    }

    let pattern = name.to_string();
    self
      .coordinator
      .with_store(move |store| store.find_summary_by_name(&pattern))
      .await?
      .ok_or_else(|| Error::NotFound(format!("summary '{}'", name)))
  }
}

fn check_range(field: &str, value: u32, range: RangeInclusive<u32>) -> Result<()> {
  if range.contains(&value) {
    Ok(())
  } else {
    Err(Error::InvalidInput(format!(
      "{} must be between {} and {}, got {}",
      field,
      range.start(),
      range.end(),
      value
    )))
  }
}
