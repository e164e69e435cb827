//! Read-through synchronization between the remote source and the record store.
//!
//! - Ingestion: fetch a listing page, upsert it in one transaction
//! - Hydration: read the store, on a miss fetch the detail, write it, read it back
//!
//! State for a summary's detail: no-detail -> fetching -> has-detail. A failed
//! fetch returns to no-detail without writing anything. Nothing here deletes.

mod coordinator;
mod hydrated;

pub use coordinator::SyncCoordinator;
pub use hydrated::{DetailOrigin, Hydrated};
