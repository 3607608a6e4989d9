//! Mutation authorization: owner secret or the admin override.

use std::sync::Arc;

use dramatis_core::store::CharacterStore;

/// Authorization verdict. Carries no detail: a missing record and a wrong
/// secret produce the same answer so callers cannot probe for existence
/// beyond what naming the record already implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  Allowed,
  Denied,
}

/// Verifies that a mutation request is authorized for a named record.
pub struct AccessGuard<S> {
  store:        Arc<S>,
  admin_secret: String,
}

impl<S: CharacterStore> AccessGuard<S> {
  pub fn new(store: Arc<S>, admin_secret: impl Into<String>) -> Self {
    Self { store, admin_secret: admin_secret.into() }
  }

  /// `Allowed` iff a record named `name` exists and `supplied` matches
  /// either its stored secret or the admin secret. Store faults propagate;
  /// every other case is `Denied`.
  pub async fn authorize(
    &self,
    name: &str,
    supplied: &str,
  ) -> Result<Access, S::Error> {
    let Some(record) = self.store.get(name).await? else {
      return Ok(Access::Denied);
    };

    if secrets_match(&record.secret, supplied)
      || secrets_match(&self.admin_secret, supplied)
    {
      Ok(Access::Allowed)
    } else {
      Ok(Access::Denied)
    }
  }
}

/// Exact byte-for-byte equality. The admin override goes through the same
/// check as per-record secrets. This is the single seam where a
/// constant-time comparison could be substituted without touching callers.
fn secrets_match(stored: &str, supplied: &str) -> bool {
  stored.as_bytes() == supplied.as_bytes()
}
