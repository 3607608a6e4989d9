//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; demographics as compact JSON.

use chrono::{DateTime, Utc};
use dramatis_core::character::{CharacterRecord, Demographics};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Demographics ────────────────────────────────────────────────────────────

pub fn encode_demographics(d: &Demographics) -> Result<String> {
  Ok(serde_json::to_string(d)?)
}

pub fn decode_demographics(s: &str) -> Result<Demographics> {
  Ok(serde_json::from_str(s)?)
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Build a `LIKE ... ESCAPE '\'` pattern matching names that start with
/// `prefix`. Metacharacters in the prefix match themselves.
pub fn like_prefix_pattern(prefix: &str) -> String {
  let mut pattern = String::with_capacity(prefix.len() + 1);
  for c in prefix.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `characters` row.
pub struct RawCharacter {
  pub name:         String,
  pub faceclaim:    String,
  pub image:        String,
  pub bio:          String,
  pub secret:       String,
  pub demographics: Option<String>,
  pub created_at:   String,
}

impl RawCharacter {
  /// Column order matches the `COLUMNS` list in `store.rs`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawCharacter {
      name:         row.get(0)?,
      faceclaim:    row.get(1)?,
      image:        row.get(2)?,
      bio:          row.get(3)?,
      secret:       row.get(4)?,
      demographics: row.get(5)?,
      created_at:   row.get(6)?,
    })
  }

  pub fn into_record(self) -> Result<CharacterRecord> {
    let demographics = self
      .demographics
      .as_deref()
      .map(decode_demographics)
      .transpose()?;

    Ok(CharacterRecord {
      name:         self.name,
      faceclaim:    self.faceclaim,
      image:        self.image,
      bio:          self.bio,
      secret:       self.secret,
      demographics,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
