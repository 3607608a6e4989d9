//! Live-viewer registry and change-event fan-out.
//!
//! The publisher owns the set of viewer connections; no other component
//! touches it. Delivery is best-effort and per-viewer: one dead viewer
//! never blocks the rest, and never fails the mutation that produced the
//! event. Liveness uses a single ping-with-deadline protocol — a viewer
//! that has not answered the previous cycle's ping by the time the next
//! cycle runs is dropped.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard, PoisonError},
};

use dramatis_core::event::ChangeEvent;
use tokio::sync::mpsc;
use uuid::Uuid;

/// One frame on a viewer's outbound channel. `Event` carries pre-serialized
/// JSON; the transport maps `Ping` to a protocol-level ping frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFrame {
  Event(String),
  Ping,
}

/// Opaque handle identifying one registered viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerHandle {
  id: Uuid,
}

impl ViewerHandle {
  pub fn id(&self) -> Uuid { self.id }
}

struct Viewer {
  tx:            mpsc::UnboundedSender<FeedFrame>,
  /// Set when a ping goes out, cleared by [`ChangePublisher::pong`]. Still
  /// set at the next sweep means the viewer is dead.
  awaiting_pong: bool,
}

/// Concurrency-safe registry of live viewers plus the fan-out itself.
///
/// Sends are non-blocking (unbounded channels), so the registry lock is
/// never held across an await point. Per-viewer channel FIFO is the only
/// delivery-order guarantee.
#[derive(Default)]
pub struct ChangePublisher {
  viewers: Mutex<HashMap<Uuid, Viewer>>,
}

impl ChangePublisher {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a new viewer. The receiver closing (dropped by the transport)
  /// is equivalent to an unsubscribe; the registry notices on the next send.
  pub fn subscribe(&self) -> (ViewerHandle, mpsc::UnboundedReceiver<FeedFrame>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let id = Uuid::new_v4();
    self
      .locked()
      .insert(id, Viewer { tx, awaiting_pong: false });
    tracing::debug!(viewer = %id, "viewer subscribed");
    (ViewerHandle { id }, rx)
  }

  /// Remove a viewer; idempotent.
  pub fn unsubscribe(&self, handle: &ViewerHandle) {
    if self.locked().remove(&handle.id).is_some() {
      tracing::debug!(viewer = %handle.id, "viewer unsubscribed");
    }
  }

  /// Record a liveness response from a viewer.
  pub fn pong(&self, handle: &ViewerHandle) {
    if let Some(viewer) = self.locked().get_mut(&handle.id) {
      viewer.awaiting_pong = false;
    }
  }

  /// Fan a change event out to every currently registered viewer.
  ///
  /// The event is serialized once. A failed send means the viewer's
  /// receiver is gone; that viewer is removed and the failure is logged,
  /// never propagated.
  pub fn publish(&self, event: &ChangeEvent) {
    let payload = match serde_json::to_string(event) {
      Ok(p) => p,
      Err(e) => {
        tracing::error!(error = %e, "change event serialization failed");
        return;
      }
    };

    let mut viewers = self.locked();
    let before = viewers.len();
    viewers.retain(|id, viewer| {
      let delivered =
        viewer.tx.send(FeedFrame::Event(payload.clone())).is_ok();
      if !delivered {
        tracing::debug!(viewer = %id, "dropping viewer with closed channel");
      }
      delivered
    });

    tracing::debug!(
      action = event.action(),
      name = event.name(),
      viewers = viewers.len(),
      dropped = before - viewers.len(),
      "change event published"
    );
  }

  /// Run one liveness cycle: drop viewers that never answered the previous
  /// ping, then ping everyone who remains and mark them as owing a pong.
  pub fn sweep(&self) {
    let mut viewers = self.locked();
    let before = viewers.len();
    viewers.retain(|id, viewer| {
      if viewer.awaiting_pong {
        tracing::debug!(viewer = %id, "dropping unresponsive viewer");
        return false;
      }
      viewer.awaiting_pong = true;
      viewer.tx.send(FeedFrame::Ping).is_ok()
    });

    let dropped = before - viewers.len();
    if dropped > 0 {
      tracing::info!(
        dropped,
        remaining = viewers.len(),
        "liveness sweep pruned viewers"
      );
    }
  }

  /// Number of currently registered viewers.
  pub fn viewer_count(&self) -> usize {
    self.locked().len()
  }

  /// A poisoned lock only means a panic mid-mutation elsewhere; the map is
  /// still structurally sound, so recover rather than propagate the panic.
  fn locked(&self) -> MutexGuard<'_, HashMap<Uuid, Viewer>> {
    self.viewers.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn event() -> ChangeEvent {
    ChangeEvent::deleted("Annika")
  }

  #[test]
  fn publish_reaches_every_viewer() {
    let publisher = ChangePublisher::new();
    let (_h1, mut rx1) = publisher.subscribe();
    let (_h2, mut rx2) = publisher.subscribe();

    publisher.publish(&event());

    for rx in [&mut rx1, &mut rx2] {
      match rx.try_recv().unwrap() {
        FeedFrame::Event(json) => {
          assert!(json.contains(r#""action":"delete""#))
        }
        other => panic!("expected event frame, got {other:?}"),
      }
    }
  }

  #[test]
  fn publish_with_no_viewers_is_a_no_op() {
    ChangePublisher::new().publish(&event());
  }

  #[test]
  fn unsubscribed_viewer_receives_nothing() {
    let publisher = ChangePublisher::new();
    let (handle, mut rx) = publisher.subscribe();

    publisher.unsubscribe(&handle);
    publisher.unsubscribe(&handle); // idempotent
    assert_eq!(publisher.viewer_count(), 0);

    publisher.publish(&event());
    assert!(rx.try_recv().is_err());
  }

  #[test]
  fn dropped_receiver_is_pruned_on_publish() {
    let publisher = ChangePublisher::new();
    let (_handle, rx) = publisher.subscribe();
    drop(rx);

    publisher.publish(&event());
    assert_eq!(publisher.viewer_count(), 0);
  }

  #[test]
  fn sweep_pings_then_drops_the_silent() {
    let publisher = ChangePublisher::new();
    let (_handle, mut rx) = publisher.subscribe();

    publisher.sweep();
    assert_eq!(rx.try_recv().unwrap(), FeedFrame::Ping);
    assert_eq!(publisher.viewer_count(), 1);

    // No pong before the next cycle: gone.
    publisher.sweep();
    assert_eq!(publisher.viewer_count(), 0);
    assert!(matches!(
      rx.try_recv(),
      Err(mpsc::error::TryRecvError::Disconnected)
    ));
  }

  #[test]
  fn pong_keeps_a_viewer_alive_across_sweeps() {
    let publisher = ChangePublisher::new();
    let (handle, mut rx) = publisher.subscribe();

    for _ in 0..3 {
      publisher.sweep();
      assert_eq!(rx.try_recv().unwrap(), FeedFrame::Ping);
      publisher.pong(&handle);
    }
    assert_eq!(publisher.viewer_count(), 1);
  }

  #[test]
  fn frames_arrive_in_publish_order() {
    let publisher = ChangePublisher::new();
    let (_handle, mut rx) = publisher.subscribe();

    publisher.publish(&ChangeEvent::edited("a"));
    publisher.publish(&ChangeEvent::edited("b"));

    let FeedFrame::Event(first) = rx.try_recv().unwrap() else {
      panic!("expected event")
    };
    let FeedFrame::Event(second) = rx.try_recv().unwrap() else {
      panic!("expected event")
    };
    assert!(first.contains(r#""name":"a""#));
    assert!(second.contains(r#""name":"b""#));
  }
}
