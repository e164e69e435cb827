//! Remote catalog gateway: paginated listings and per-item detail documents.

mod api_types;
mod client;
#[cfg(test)]
pub mod fake;

pub use client::{SourceClient, SourceGateway};
