/// Result of a hydration, including where the value came from.
#[derive(Debug, Clone)]
pub struct Hydrated<T> {
  pub data: T,
  pub origin: DetailOrigin,
}

impl<T> Hydrated<T> {
  /// Value already present in the store; no remote call was made.
  pub fn from_store(data: T) -> Self {
    Self {
      data,
      origin: DetailOrigin::Store,
    }
  }

  /// Value fetched remotely, written, then read back from the store.
  pub fn from_remote(data: T) -> Self {
    Self {
      data,
      origin: DetailOrigin::Remote,
    }
  }

  pub fn into_inner(self) -> T {
    self.data
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailOrigin {
  /// Cache hit
  Store,
  /// Cache miss, paid for with a remote fetch
  Remote,
}
