//! Change events pushed to live viewers.
//!
//! One event is produced per successful mutation and fanned out to every
//! viewer connected at that moment. Events are never queued or replayed for
//! late subscribers.

use serde::Serialize;

use crate::character::{CharacterRecord, Demographics};

/// A roster change, serialized with an `action` tag matching the viewer
/// protocol: `{"action":"create",...}`, `{"action":"edit","name":...}`,
/// `{"action":"delete","name":...}`.
///
/// Only `create` carries a snapshot; viewers re-fetch on `edit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ChangeEvent {
  Create {
    name:         String,
    faceclaim:    String,
    image:        String,
    bio:          String,
    #[serde(skip_serializing_if = "Option::is_none")]
    demographics: Option<Demographics>,
  },
  Edit {
    name: String,
  },
  Delete {
    name: String,
  },
}

impl ChangeEvent {
  /// Snapshot event for a freshly created record. The credential and
  /// store-internal fields are not part of the snapshot.
  pub fn created(record: &CharacterRecord) -> Self {
    ChangeEvent::Create {
      name:         record.name.clone(),
      faceclaim:    record.faceclaim.clone(),
      image:        record.image.clone(),
      bio:          record.bio.clone(),
      demographics: record.demographics,
    }
  }

  pub fn edited(name: impl Into<String>) -> Self {
    ChangeEvent::Edit { name: name.into() }
  }

  pub fn deleted(name: impl Into<String>) -> Self {
    ChangeEvent::Delete { name: name.into() }
  }

  /// The wire `action` tag.
  pub fn action(&self) -> &'static str {
    match self {
      ChangeEvent::Create { .. } => "create",
      ChangeEvent::Edit { .. } => "edit",
      ChangeEvent::Delete { .. } => "delete",
    }
  }

  /// The affected character name.
  pub fn name(&self) -> &str {
    match self {
      ChangeEvent::Create { name, .. }
      | ChangeEvent::Edit { name }
      | ChangeEvent::Delete { name } => name,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn record() -> CharacterRecord {
    CharacterRecord {
      name:         "Milo".into(),
      faceclaim:    "M. Example".into(),
      image:        "https://cdn.example.com/milo.jpg".into(),
      bio:          "Quiet archivist.".into(),
      secret:       "swordfish".into(),
      demographics: None,
      created_at:   Utc::now(),
    }
  }

  #[test]
  fn create_event_wire_format() {
    let json = serde_json::to_string(&ChangeEvent::created(&record())).unwrap();
    assert!(json.contains(r#""action":"create""#));
    assert!(json.contains(r#""name":"Milo""#));
    assert!(json.contains(r#""faceclaim":"M. Example""#));
    assert!(json.contains(r#""bio":"Quiet archivist.""#));
    // no credential, no internal fields, no absent demographics
    assert!(!json.contains("secret"));
    assert!(!json.contains("swordfish"));
    assert!(!json.contains("created_at"));
    assert!(!json.contains("demographics"));
  }

  #[test]
  fn edit_and_delete_carry_only_the_name() {
    assert_eq!(
      serde_json::to_string(&ChangeEvent::edited("Milo")).unwrap(),
      r#"{"action":"edit","name":"Milo"}"#
    );
    assert_eq!(
      serde_json::to_string(&ChangeEvent::deleted("Milo")).unwrap(),
      r#"{"action":"delete","name":"Milo"}"#
    );
  }

  #[test]
  fn action_tags() {
    assert_eq!(ChangeEvent::created(&record()).action(), "create");
    assert_eq!(ChangeEvent::edited("x").action(), "edit");
    assert_eq!(ChangeEvent::deleted("x").action(), "delete");
    assert_eq!(ChangeEvent::deleted("x").name(), "x");
  }
}
