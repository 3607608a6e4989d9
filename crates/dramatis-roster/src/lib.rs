//! The roster synchronization core: authoritative character operations plus
//! the live-update fan-out to subscribed viewers.
//!
//! Transports (HTTP handlers, chat commands) call into [`RosterService`]
//! with the same validation and authorization rules regardless of caller.
//! The service validates, authorizes, commits through a
//! [`CharacterStore`](dramatis_core::store::CharacterStore), and only then
//! hands the change to the [`ChangePublisher`].

pub mod guard;
pub mod publish;
pub mod service;

pub use guard::{Access, AccessGuard};
pub use publish::{ChangePublisher, FeedFrame, ViewerHandle};
pub use service::RosterService;

#[cfg(test)]
mod tests;
