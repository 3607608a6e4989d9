//! The `CharacterStore` trait.
//!
//! Implemented by storage backends (e.g. `dramatis-store-sqlite`). Higher
//! layers (`dramatis-roster`, `dramatis-api`) depend on this abstraction,
//! not on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (tokio with axum).

use std::future::Future;

use crate::character::{CharacterPatch, CharacterRecord, NewCharacter};

/// Outcome of [`CharacterStore::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
  /// The record was inserted; carries the persisted row.
  Created(CharacterRecord),
  /// The name is already taken; nothing was written.
  DuplicateName,
}

/// Abstraction over a roster storage backend.
///
/// Mutations are durably committed before the returned future resolves.
/// Operations on the same name are serialized by the backend; the
/// name-uniqueness check and insert in `create` are atomic, so concurrent
/// creates with the same name yield exactly one `Created`.
pub trait CharacterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a new record, assigning its creation timestamp.
  fn create(
    &self,
    input: NewCharacter,
  ) -> impl Future<Output = Result<CreateOutcome, Self::Error>> + Send + '_;

  /// Exact, case-sensitive lookup by name.
  fn get<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<CharacterRecord>, Self::Error>> + Send + 'a;

  /// Case-insensitive prefix lookup, at most `limit` rows, ordered by name.
  /// No match is an empty vector, not an error.
  fn find_by_prefix<'a>(
    &'a self,
    prefix: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<CharacterRecord>, Self::Error>> + Send + 'a;

  /// Apply the provided fields to an existing record and return the updated
  /// row, or `None` if the name is unknown. Fields absent from the patch are
  /// left untouched; the read-modify-write is atomic per name.
  fn update<'a>(
    &'a self,
    name: &'a str,
    patch: CharacterPatch,
  ) -> impl Future<Output = Result<Option<CharacterRecord>, Self::Error>> + Send + 'a;

  /// Remove a record. `false` if the name is unknown.
  fn delete<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Snapshot of every record, ordered by name case-insensitively.
  fn list_all(
    &self,
  ) -> impl Future<Output = Result<Vec<CharacterRecord>, Self::Error>> + Send + '_;
}
