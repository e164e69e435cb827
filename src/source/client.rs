use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::api_types::{ApiDetailDocument, ApiListingResponse};
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::store::{DetailPayload, NewSummary};

/// Remote catalog access. Network I/O only, never touches the store.
#[async_trait]
pub trait SourceGateway: Send + Sync {
  /// One page of the listing. An empty page is `Ok(vec![])`.
  async fn fetch_batch(&self, limit: u32, offset: u32) -> Result<Vec<NewSummary>>;

  /// The detail document behind a summary url, normalized.
  async fn fetch_detail(&self, url: &str) -> Result<DetailPayload>;
}

/// HTTP client for the remote catalog
#[derive(Clone)]
pub struct SourceClient {
  http: reqwest::Client,
  listing_url: Url,
}

impl SourceClient {
  pub fn new(config: &SourceConfig) -> Result<Self> {
    let listing_url = Url::parse(&config.base_url)
      .map_err(|e| Error::InvalidInput(format!("source url {}: {}", config.base_url, e)))?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(concat!("dexcache/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| Error::upstream(listing_url.as_str(), e))?;

    Ok(Self { http, listing_url })
  }

  /// Listing url with pagination parameters applied
  fn batch_url(&self, limit: u32, offset: u32) -> Url {
    let mut url = self.listing_url.clone();
    url
      .query_pairs_mut()
      .append_pair("limit", &limit.to_string())
      .append_pair("offset", &offset.to_string());
    url
  }

  /// GET a JSON document, mapping every failure mode to `Error::Upstream`
  async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
    let response = self.http.get(url).send().await.map_err(|e| {
      warn!(url, error = %e, "upstream request failed");
      Error::upstream(url, e)
    })?;

    let status = response.status();
    if !status.is_success() {
      warn!(url, %status, "upstream returned non-success status");
      return Err(Error::upstream(url, format!("status {}", status)));
    }

    let body = response.bytes().await.map_err(|e| Error::upstream(url, e))?;
    serde_json::from_slice(&body)
      .map_err(|e| Error::upstream(url, format!("malformed response: {}", e)))
  }
}

#[async_trait]
impl SourceGateway for SourceClient {
  async fn fetch_batch(&self, limit: u32, offset: u32) -> Result<Vec<NewSummary>> {
    let url = self.batch_url(limit, offset);
    let response: ApiListingResponse = self.get_json(url.as_str()).await?;
    let total = response.count;
    let rows = response.into_summaries();

    debug!(
      limit,
      offset,
      total = ?total,
      returned = rows.len(),
      "fetched listing page"
    );

    Ok(rows)
  }

  async fn fetch_detail(&self, url: &str) -> Result<DetailPayload> {
    let document: ApiDetailDocument = self.get_json(url).await?;
    Ok(document.into_payload())
  }
}
