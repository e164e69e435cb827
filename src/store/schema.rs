/// Schema for the catalog tables. Safe to apply on every open.
pub const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

-- Listing entries, deduplicated on url
CREATE TABLE IF NOT EXISTS summaries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    -- Unicode-lowercased name, the column name lookups match against
    name_folded TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_summaries_name_folded ON summaries(name_folded);

-- Lazily hydrated enrichment, one row per summary
CREATE TABLE IF NOT EXISTS details (
    summary_id INTEGER PRIMARY KEY REFERENCES summaries(id),
    categories TEXT NOT NULL DEFAULT '',
    traits TEXT NOT NULL DEFAULT '',
    primary_metric INTEGER,
    dimension_a INTEGER,
    dimension_b INTEGER,
    media_url TEXT,
    fetched_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
