//! The roster operation failure taxonomy.

use thiserror::Error;

/// Typed failures of the roster operations. All are caller-recoverable;
/// none is fatal to the service. Callers translate these into whatever
/// their surface shows users; the roster itself never formats user-facing
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
  /// The image URL fails the policy (https scheme, jpg/jpeg/png extension,
  /// length bound).
  #[error("image URL rejected")]
  InvalidImage,

  #[error("character name {0:?} is already taken")]
  DuplicateName(String),

  #[error("no character matches {0:?}")]
  NotFound(String),

  /// Wrong secret, or the named record does not exist. The two cases are
  /// deliberately indistinguishable to the caller.
  #[error("authorization denied")]
  Denied,

  /// A prefix matched more than one character; carries the candidate names
  /// so the caller can disambiguate.
  #[error("name prefix is ambiguous")]
  Ambiguous(Vec<String>),

  /// Unexpected backend fault. Detail stays in the server log.
  #[error("internal error")]
  Internal,
}

pub type Result<T, E = RosterError> = std::result::Result<T, E>;
