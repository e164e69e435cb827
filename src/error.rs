//! Error taxonomy shared by the gateway, store, coordinator and query layers.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
  /// Remote source unreachable, non-success status, timeout or malformed body.
  #[error("upstream request to {url} failed: {reason}")]
  Upstream { url: String, reason: String },

  /// Requested name or key is absent from the store.
  #[error("{0} not found")]
  NotFound(String),

  #[error("store error: {0}")]
  Store(#[from] rusqlite::Error),

  /// The store could not be reached at all (poisoned lock, aborted blocking task).
  #[error("store unavailable: {0}")]
  StoreUnavailable(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),
}

impl Error {
  pub fn upstream(url: impl Into<String>, reason: impl ToString) -> Self {
    Self::Upstream {
      url: url.into(),
      reason: reason.to_string(),
    }
  }
}

impl From<tokio::task::JoinError> for Error {
  fn from(e: tokio::task::JoinError) -> Self {
    Error::StoreUnavailable(format!("blocking task failed: {}", e))
  }
}
