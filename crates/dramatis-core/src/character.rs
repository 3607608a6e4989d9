//! Character records — the sole persisted entity of the roster.
//!
//! A record is always fully populated; there are no partial records and no
//! history. The public face of a record is [`CharacterProfile`], which drops
//! the credential and store-internal fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Demographics ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Woman,
  Man,
  Nonbinary,
  Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
  Straight,
  Gay,
  Lesbian,
  Bisexual,
  Pansexual,
  Asexual,
  Other,
}

/// The program a character is enrolled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Program {
  Arts,
  Sciences,
  Engineering,
  Business,
  Medicine,
  Law,
  Undeclared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Year {
  Freshman,
  Sophomore,
  Junior,
  Senior,
  Graduate,
  Alumni,
}

/// Optional closed-vocabulary display tags. Purely informational; nothing in
/// the roster behaves differently based on them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gender:      Option<Gender>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub orientation: Option<Orientation>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub program:     Option<Program>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub year:        Option<Year>,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A character sheet as stored. `name` is the primary key.
///
/// Deliberately does not implement `Serialize`: `secret` must never leave the
/// process. Everything that goes over a wire is a [`CharacterProfile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRecord {
  pub name:         String,
  pub faceclaim:    String,
  pub image:        String,
  pub bio:          String,
  /// Opaque credential, compared byte-for-byte at authorization time.
  pub secret:       String,
  pub demographics: Option<Demographics>,
  /// Assigned by the store at insert time; not part of the public view.
  pub created_at:   DateTime<Utc>,
}

impl CharacterRecord {
  /// The public read model for this record.
  pub fn profile(&self) -> CharacterProfile {
    CharacterProfile {
      name:         self.name.clone(),
      faceclaim:    self.faceclaim.clone(),
      image:        self.image.clone(),
      bio:          self.bio.clone(),
      demographics: self.demographics,
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input for the create operation. The store assigns `created_at`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCharacter {
  pub name:         String,
  pub faceclaim:    String,
  pub image:        String,
  pub bio:          String,
  pub secret:       String,
  #[serde(default)]
  pub demographics: Option<Demographics>,
}

/// Fields of an edit. `None` leaves the stored value untouched; `name` and
/// `secret` are not editable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterPatch {
  pub faceclaim:    Option<String>,
  pub image:        Option<String>,
  pub bio:          Option<String>,
  pub demographics: Option<Demographics>,
}

impl CharacterPatch {
  /// True when the patch changes nothing.
  pub fn is_empty(&self) -> bool {
    self.faceclaim.is_none()
      && self.image.is_none()
      && self.bio.is_none()
      && self.demographics.is_none()
  }
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// The public fields of a record — the only record shape ever serialized
/// outward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterProfile {
  pub name:         String,
  pub faceclaim:    String,
  pub image:        String,
  pub bio:          String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub demographics: Option<Demographics>,
}
