//! Serde-deserializable types matching the remote catalog responses.
//!
//! These types are separate from the store records so the wire shape can stay
//! loose (every field optional) while the records stay normalized.

use serde::Deserialize;

use crate::store::{join_list, DetailPayload, NewSummary};

// ============================================================================
// Listing endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiListingEntry {
  pub name: String,
  pub url: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiListingResponse {
  #[serde(default)]
  pub count: Option<u64>,
  #[serde(default)]
  pub results: Option<Vec<ApiListingEntry>>,
}

// ============================================================================
// Detail endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiNamedRef {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiTypeSlot {
  #[serde(rename = "type")]
  pub type_ref: ApiNamedRef,
}

#[derive(Debug, Deserialize)]
pub struct ApiAbilitySlot {
  pub ability: ApiNamedRef,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiSprites {
  pub front_default: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiDetailDocument {
  #[serde(default)]
  pub types: Option<Vec<ApiTypeSlot>>,
  #[serde(default)]
  pub abilities: Option<Vec<ApiAbilitySlot>>,
  pub base_experience: Option<i64>,
  pub height: Option<i64>,
  pub weight: Option<i64>,
  pub sprites: Option<ApiSprites>,
}

// ============================================================================
// Conversions to store records
// ============================================================================

impl From<ApiListingEntry> for NewSummary {
  fn from(entry: ApiListingEntry) -> Self {
    NewSummary {
      name: entry.name,
      url: entry.url,
    }
  }
}

impl ApiListingResponse {
  pub fn into_summaries(self) -> Vec<NewSummary> {
    self
      .results
      .unwrap_or_default()
      .into_iter()
      .map(NewSummary::from)
      .collect()
  }
}

impl ApiDetailDocument {
  pub fn into_payload(self) -> DetailPayload {
    let types = self.types.unwrap_or_default();
    let abilities = self.abilities.unwrap_or_default();
    DetailPayload {
      categories: join_list(types.iter().map(|t| t.type_ref.name.as_str())),
      traits: join_list(abilities.iter().map(|a| a.ability.name.as_str())),
      primary_metric: self.base_experience,
      dimension_a: self.height,
      dimension_b: self.weight,
      media_url: self.sprites.and_then(|s| s.front_default),
    }
  }
}
