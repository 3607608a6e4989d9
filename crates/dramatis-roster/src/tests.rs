//! Service-level tests against the real SQLite store (in-memory).

use std::sync::Arc;

use dramatis_core::{
  RosterError,
  character::{CharacterPatch, NewCharacter},
};
use dramatis_store_sqlite::SqliteStore;

use crate::{Access, AccessGuard, ChangePublisher, FeedFrame, RosterService};

const ADMIN: &str = "overseer";

async fn service() -> RosterService<SqliteStore> {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  RosterService::new(store, ADMIN, Arc::new(ChangePublisher::new()))
}

fn new_character(name: &str) -> NewCharacter {
  NewCharacter {
    name:         name.to_owned(),
    faceclaim:    "Some Actor".to_owned(),
    image:        "https://cdn.example.com/sheet.png".to_owned(),
    bio:          "A storied past.".to_owned(),
    secret:       "hunter2".to_owned(),
    demographics: None,
  }
}

fn bio_patch(bio: &str) -> CharacterPatch {
  CharacterPatch { bio: Some(bio.to_owned()), ..Default::default() }
}

// ─── Create / show ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_show_roundtrip_without_secret() {
  let svc = service().await;

  let created = svc.create(new_character("Annika")).await.unwrap();
  let shown = svc.show("Annika").await.unwrap();
  assert_eq!(shown, created);
  assert_eq!(shown.bio, "A storied past.");

  let json = serde_json::to_string(&shown).unwrap();
  assert!(!json.contains("hunter2"));
}

#[tokio::test]
async fn create_rejects_bad_image_before_writing() {
  let svc = service().await;

  let mut input = new_character("Annika");
  input.image = "http://cdn.example.com/sheet.png".to_owned();
  assert_eq!(svc.create(input).await, Err(RosterError::InvalidImage));

  assert!(matches!(
    svc.show("Annika").await,
    Err(RosterError::NotFound(_))
  ));
}

#[tokio::test]
async fn create_duplicate_name() {
  let svc = service().await;
  svc.create(new_character("Annika")).await.unwrap();

  assert_eq!(
    svc.create(new_character("Annika")).await,
    Err(RosterError::DuplicateName("Annika".to_owned()))
  );
}

#[tokio::test]
async fn concurrent_creates_yield_exactly_one_winner() {
  let svc = Arc::new(service().await);

  let tasks: Vec<_> = (0..4)
    .map(|_| {
      let svc = svc.clone();
      tokio::spawn(async move { svc.create(new_character("Annika")).await })
    })
    .collect();

  let mut wins = 0;
  let mut duplicates = 0;
  for task in tasks {
    match task.await.unwrap() {
      Ok(_) => wins += 1,
      Err(RosterError::DuplicateName(_)) => duplicates += 1,
      Err(other) => panic!("unexpected failure: {other:?}"),
    }
  }
  assert_eq!((wins, duplicates), (1, 3));
}

// ─── Edit ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn edit_with_wrong_secret_changes_nothing() {
  let svc = service().await;
  svc.create(new_character("Annika")).await.unwrap();
  let before = svc.show("Annika").await.unwrap();

  assert_eq!(
    svc.edit("Annika", "wrong", bio_patch("vandalized")).await,
    Err(RosterError::Denied)
  );
  assert_eq!(svc.show("Annika").await.unwrap(), before);
}

#[tokio::test]
async fn edit_with_owner_secret() {
  let svc = service().await;
  svc.create(new_character("Annika")).await.unwrap();

  let updated = svc
    .edit("Annika", "hunter2", bio_patch("Rewritten."))
    .await
    .unwrap();
  assert_eq!(updated.bio, "Rewritten.");
  assert_eq!(updated.faceclaim, "Some Actor");
}

#[tokio::test]
async fn edit_with_admin_override_ignores_record_secret() {
  let svc = service().await;
  svc.create(new_character("Annika")).await.unwrap();

  let updated = svc
    .edit("Annika", ADMIN, bio_patch("Moderated."))
    .await
    .unwrap();
  assert_eq!(updated.bio, "Moderated.");
}

#[tokio::test]
async fn edit_rejects_bad_image_even_when_authorized() {
  let svc = service().await;
  svc.create(new_character("Annika")).await.unwrap();
  let before = svc.show("Annika").await.unwrap();

  let patch = CharacterPatch {
    image: Some("https://cdn.example.com/a.gif".to_owned()),
    ..Default::default()
  };
  assert_eq!(
    svc.edit("Annika", "hunter2", patch).await,
    Err(RosterError::InvalidImage)
  );
  assert_eq!(svc.show("Annika").await.unwrap(), before);
}

#[tokio::test]
async fn edit_unknown_name_is_denied_not_revealed() {
  let svc = service().await;
  // Even the admin override cannot distinguish a wrong secret from a
  // missing record.
  assert_eq!(
    svc.edit("Nobody", ADMIN, bio_patch("x")).await,
    Err(RosterError::Denied)
  );
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_with_owner_secret_then_gone() {
  let svc = service().await;
  svc.create(new_character("Annika")).await.unwrap();

  svc.delete("Annika", "hunter2").await.unwrap();
  assert!(matches!(
    svc.show("Annika").await,
    Err(RosterError::NotFound(_))
  ));
}

#[tokio::test]
async fn delete_wrong_secret_denied_and_kept() {
  let svc = service().await;
  svc.create(new_character("Annika")).await.unwrap();

  assert_eq!(
    svc.delete("Annika", "wrong").await,
    Err(RosterError::Denied)
  );
  assert!(svc.show("Annika").await.is_ok());
}

#[tokio::test]
async fn delete_unknown_name_is_denied() {
  let svc = service().await;
  assert_eq!(svc.delete("Nobody", ADMIN).await, Err(RosterError::Denied));
}

// ─── Show resolution / list ──────────────────────────────────────────────────

#[tokio::test]
async fn show_resolves_a_unique_prefix() {
  let svc = service().await;
  svc.create(new_character("Annika")).await.unwrap();
  svc.create(new_character("Bruno")).await.unwrap();

  assert_eq!(svc.show("ann").await.unwrap().name, "Annika");
}

#[tokio::test]
async fn show_exact_match_beats_prefix_expansion() {
  let svc = service().await;
  svc.create(new_character("Ann")).await.unwrap();
  svc.create(new_character("Annika")).await.unwrap();

  assert_eq!(svc.show("Ann").await.unwrap().name, "Ann");
}

#[tokio::test]
async fn show_ambiguous_prefix_reports_candidates() {
  let svc = service().await;
  svc.create(new_character("Annika")).await.unwrap();
  svc.create(new_character("Anneliese")).await.unwrap();

  match svc.show("ann").await {
    Err(RosterError::Ambiguous(mut names)) => {
      names.sort();
      assert_eq!(names, ["Anneliese", "Annika"]);
    }
    other => panic!("expected Ambiguous, got {other:?}"),
  }
}

#[tokio::test]
async fn list_returns_profiles_in_name_order() {
  let svc = service().await;
  svc.create(new_character("bruno")).await.unwrap();
  svc.create(new_character("Annika")).await.unwrap();

  let all = svc.list().await.unwrap();
  let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
  assert_eq!(names, ["Annika", "bruno"]);
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn each_successful_mutation_emits_exactly_one_event() {
  let svc = service().await;
  let (_handle, mut rx) = svc.publisher().subscribe();

  svc.create(new_character("Annika")).await.unwrap();
  svc
    .edit("Annika", "hunter2", bio_patch("Rewritten."))
    .await
    .unwrap();
  svc.delete("Annika", "hunter2").await.unwrap();

  for expected in ["create", "edit", "delete"] {
    match rx.try_recv().unwrap() {
      FeedFrame::Event(json) => {
        assert!(json.contains(&format!(r#""action":"{expected}""#)));
        assert!(json.contains(r#""name":"Annika""#));
      }
      other => panic!("expected event frame, got {other:?}"),
    }
  }
  assert!(rx.try_recv().is_err(), "no extra frames expected");
}

#[tokio::test]
async fn failed_operations_emit_no_event() {
  let svc = service().await;
  svc.create(new_character("Annika")).await.unwrap();

  let (_handle, mut rx) = svc.publisher().subscribe();

  let _ = svc.create(new_character("Annika")).await; // DuplicateName
  let _ = svc.edit("Annika", "wrong", bio_patch("x")).await; // Denied
  let _ = svc.delete("Nobody", ADMIN).await; // Denied
  let _ = svc.show("Annika").await; // read-only
  let _ = svc.list().await; // read-only

  assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn create_event_carries_the_public_snapshot() {
  let svc = service().await;
  let (_handle, mut rx) = svc.publisher().subscribe();

  svc.create(new_character("Annika")).await.unwrap();

  let FeedFrame::Event(json) = rx.try_recv().unwrap() else {
    panic!("expected event frame")
  };
  assert!(json.contains(r#""faceclaim":"Some Actor""#));
  assert!(json.contains(r#""bio":"A storied past.""#));
  assert!(!json.contains("hunter2"));
}

// ─── Guard ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn guard_verdicts() {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let svc = RosterService::new(store.clone(), ADMIN, Arc::new(ChangePublisher::new()));
  svc.create(new_character("Annika")).await.unwrap();

  let guard = AccessGuard::new(store, ADMIN);
  assert_eq!(guard.authorize("Annika", "hunter2").await.unwrap(), Access::Allowed);
  assert_eq!(guard.authorize("Annika", ADMIN).await.unwrap(), Access::Allowed);
  assert_eq!(guard.authorize("Annika", "wrong").await.unwrap(), Access::Denied);
  assert_eq!(guard.authorize("Annika", "").await.unwrap(), Access::Denied);
  assert_eq!(guard.authorize("Nobody", ADMIN).await.unwrap(), Access::Denied);
}
