//! In-memory gateway for tests. Counts calls, never touches the network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::SourceGateway;
use crate::error::{Error, Result};
use crate::store::{DetailPayload, NewSummary};

#[derive(Default)]
pub struct FakeGateway {
  listing: Mutex<Vec<NewSummary>>,
  details: Mutex<HashMap<String, DetailPayload>>,
  failing: AtomicBool,
  /// Simulated remote latency, so concurrent callers overlap
  latency: Option<Duration>,
  batch_calls: AtomicUsize,
  detail_calls: AtomicUsize,
}

impl FakeGateway {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = Some(latency);
    self
  }

  pub fn with_entry(self, name: &str, url: &str, detail: DetailPayload) -> Self {
    self.listing.lock().unwrap().push(NewSummary {
      name: name.to_string(),
      url: url.to_string(),
    });
    self.details.lock().unwrap().insert(url.to_string(), detail);
    self
  }

  /// Replace the display name of an already listed entry
  pub fn rename(&self, url: &str, name: &str) {
    for entry in self.listing.lock().unwrap().iter_mut() {
      if entry.url == url {
        entry.name = name.to_string();
      }
    }
  }

  pub fn set_detail(&self, url: &str, detail: DetailPayload) {
    self.details.lock().unwrap().insert(url.to_string(), detail);
  }

  pub fn set_failing(&self, failing: bool) {
    self.failing.store(failing, Ordering::SeqCst);
  }

  pub fn detail_calls(&self) -> usize {
    self.detail_calls.load(Ordering::SeqCst)
  }

  pub fn batch_calls(&self) -> usize {
    self.batch_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl SourceGateway for FakeGateway {
  async fn fetch_batch(&self, limit: u32, offset: u32) -> Result<Vec<NewSummary>> {
    self.batch_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(latency) = self.latency {
      tokio::time::sleep(latency).await;
    }
    if self.failing.load(Ordering::SeqCst) {
      return Err(Error::upstream("fake://listing", "status 500 Internal Server Error"));
    }

    let listing = self.listing.lock().unwrap();
    Ok(
      listing
        .iter()
        .skip(offset as usize)
        .take(limit as usize)
        .cloned()
        .collect(),
    )
  }

  async fn fetch_detail(&self, url: &str) -> Result<DetailPayload> {
    self.detail_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(latency) = self.latency {
      tokio::time::sleep(latency).await;
    }
    if self.failing.load(Ordering::SeqCst) {
      return Err(Error::upstream(url, "status 500 Internal Server Error"));
    }

    self
      .details
      .lock()
      .unwrap()
      .get(url)
      .cloned()
      .ok_or_else(|| Error::upstream(url, "status 404 Not Found"))
  }
}
