use chrono::{DateTime, Utc};

/// Delimiter used when flattening category/trait lists into a single column.
pub const LIST_DELIMITER: char = ',';

/// One catalog entry as it arrives from the listing endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSummary {
  pub name: String,
  pub url: String,
}

/// Persisted catalog entry. `url` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
  pub id: i64,
  pub name: String,
  pub url: String,
}

/// Normalized detail document, ready to be written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailPayload {
  pub categories: String,
  pub traits: String,
  pub primary_metric: Option<i64>,
  /// Source-native units (decimetres)
  pub dimension_a: Option<i64>,
  /// Source-native units (hectograms)
  pub dimension_b: Option<i64>,
  pub media_url: Option<String>,
}

/// Persisted enrichment row, at most one per summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
  pub summary_id: i64,
  pub categories: String,
  pub traits: String,
  pub primary_metric: Option<i64>,
  pub dimension_a: Option<i64>,
  pub dimension_b: Option<i64>,
  pub media_url: Option<String>,
  pub fetched_at: DateTime<Utc>,
}

/// Join names into the stored delimited form. Empty input gives `""`.
pub fn join_list<I, S>(names: I) -> String
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut out = String::new();
  for (i, name) in names.into_iter().enumerate() {
    if i > 0 {
      out.push(LIST_DELIMITER);
    }
    out.push_str(name.as_ref());
  }
  out
}
