//! The `/ws` live change feed.
//!
//! Each accepted upgrade is one viewer connection. Outbound traffic comes
//! from the viewer's per-connection channel in the [`ChangePublisher`];
//! inbound pongs feed the liveness sweep. Viewers have nothing else to say,
//! so every other inbound frame is ignored.

use std::sync::Arc;

use axum::{
  extract::{
    State,
    ws::{Message, WebSocket, WebSocketUpgrade},
  },
  response::Response,
};
use bytes::Bytes;
use dramatis_core::store::CharacterStore;
use dramatis_roster::{ChangePublisher, FeedFrame, ViewerHandle};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::AppState;

/// `GET /ws`
pub async fn handler<S>(
  ws: WebSocketUpgrade,
  State(state): State<AppState<S>>,
) -> Response
where
  S: CharacterStore + Clone + Send + Sync + 'static,
{
  let publisher = state.service.publisher().clone();
  ws.on_upgrade(move |socket| viewer_session(socket, publisher))
}

async fn viewer_session(mut socket: WebSocket, publisher: Arc<ChangePublisher>) {
  let (handle, mut rx) = publisher.subscribe();
  run_session(&mut socket, &publisher, &handle, &mut rx).await;
  publisher.unsubscribe(&handle);
  tracing::debug!(viewer = %handle.id(), "viewer session closed");
}

async fn run_session(
  socket: &mut WebSocket,
  publisher: &ChangePublisher,
  handle: &ViewerHandle,
  rx: &mut UnboundedReceiver<FeedFrame>,
) {
  loop {
    tokio::select! {
      frame = rx.recv() => {
        // `None` means the publisher pruned this viewer (failed send or
        // missed pong); close the transport too.
        let Some(frame) = frame else { break };
        let message = match frame {
          FeedFrame::Event(json) => Message::Text(json.into()),
          FeedFrame::Ping => Message::Ping(Bytes::new()),
        };
        if socket.send(message).await.is_err() {
          break;
        }
      }
      inbound = socket.recv() => {
        match inbound {
          Some(Ok(Message::Pong(_))) => publisher.pong(handle),
          Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
          Some(Ok(_)) => {}
        }
      }
    }
  }
}
