//! [`RosterService`] — orchestration of validation, authorization, storage
//! and publication.
//!
//! Each operation is one store transaction; the change event goes out
//! strictly after the mutation is durably committed and is never allowed to
//! roll it back. Exactly one event per successful mutation, none on failure,
//! none on reads.

use std::sync::Arc;

use dramatis_core::{
  RosterError,
  character::{CharacterPatch, CharacterProfile, NewCharacter},
  event::ChangeEvent,
  image::is_valid_image_url,
  store::{CharacterStore, CreateOutcome},
};

use crate::{
  guard::{Access, AccessGuard},
  publish::ChangePublisher,
};

/// How many rows a prefix lookup considers when resolving `show`; also the
/// bound on the candidate list an `Ambiguous` failure carries.
const PREFIX_CANDIDATES: usize = 10;

pub struct RosterService<S> {
  store:     Arc<S>,
  guard:     AccessGuard<S>,
  publisher: Arc<ChangePublisher>,
}

impl<S: CharacterStore> RosterService<S> {
  pub fn new(
    store: Arc<S>,
    admin_secret: impl Into<String>,
    publisher: Arc<ChangePublisher>,
  ) -> Self {
    let guard = AccessGuard::new(store.clone(), admin_secret);
    Self { store, guard, publisher }
  }

  /// The publisher viewers subscribe to.
  pub fn publisher(&self) -> &Arc<ChangePublisher> {
    &self.publisher
  }

  /// Create a character. Fails with `InvalidImage` before anything is
  /// written; `DuplicateName` comes from the store's atomic insert.
  pub async fn create(
    &self,
    input: NewCharacter,
  ) -> Result<CharacterProfile, RosterError> {
    if !is_valid_image_url(&input.image) {
      return Err(RosterError::InvalidImage);
    }

    let name = input.name.clone();
    match self.store.create(input).await.map_err(internal)? {
      CreateOutcome::Created(record) => {
        self.publisher.publish(&ChangeEvent::created(&record));
        Ok(record.profile())
      }
      CreateOutcome::DuplicateName => Err(RosterError::DuplicateName(name)),
    }
  }

  /// Apply `patch` to an existing character. Fields absent from the patch
  /// stay as they are; `name` and `secret` are not editable.
  pub async fn edit(
    &self,
    name: &str,
    secret: &str,
    patch: CharacterPatch,
  ) -> Result<CharacterProfile, RosterError> {
    if let Some(image) = patch.image.as_deref()
      && !is_valid_image_url(image)
    {
      return Err(RosterError::InvalidImage);
    }

    if self.authorize(name, secret).await? == Access::Denied {
      return Err(RosterError::Denied);
    }

    let Some(updated) = self.store.update(name, patch).await.map_err(internal)?
    else {
      // The record vanished between authorize and update.
      return Err(RosterError::NotFound(name.to_owned()));
    };

    self.publisher.publish(&ChangeEvent::edited(name));
    Ok(updated.profile())
  }

  pub async fn delete(
    &self,
    name: &str,
    secret: &str,
  ) -> Result<(), RosterError> {
    if self.authorize(name, secret).await? == Access::Denied {
      return Err(RosterError::Denied);
    }

    if !self.store.delete(name).await.map_err(internal)? {
      return Err(RosterError::NotFound(name.to_owned()));
    }

    self.publisher.publish(&ChangeEvent::deleted(name));
    Ok(())
  }

  /// Read one character. An exact name match wins; otherwise the name is
  /// treated as a case-insensitive prefix, which must resolve uniquely —
  /// several matches fail with `Ambiguous` carrying the candidate names.
  pub async fn show(&self, name: &str) -> Result<CharacterProfile, RosterError> {
    if let Some(record) = self.store.get(name).await.map_err(internal)? {
      return Ok(record.profile());
    }

    let mut matches = self
      .store
      .find_by_prefix(name, PREFIX_CANDIDATES)
      .await
      .map_err(internal)?;

    match matches.len() {
      0 => Err(RosterError::NotFound(name.to_owned())),
      1 => Ok(matches.remove(0).profile()),
      _ => Err(RosterError::Ambiguous(
        matches.into_iter().map(|r| r.name).collect(),
      )),
    }
  }

  /// Snapshot of every character's public fields.
  pub async fn list(&self) -> Result<Vec<CharacterProfile>, RosterError> {
    let records = self.store.list_all().await.map_err(internal)?;
    Ok(records.iter().map(|r| r.profile()).collect())
  }

  async fn authorize(
    &self,
    name: &str,
    secret: &str,
  ) -> Result<Access, RosterError> {
    self.guard.authorize(name, secret).await.map_err(internal)
  }
}

/// Boundary for unexpected backend faults: the detail goes to the log, the
/// caller gets a generic failure.
fn internal<E: std::error::Error>(e: E) -> RosterError {
  tracing::error!(error = %e, "store failure");
  RosterError::Internal
}
