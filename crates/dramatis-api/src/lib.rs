//! HTTP surface for the dramatis roster.
//!
//! Exposes an axum [`Router`] backed by any
//! [`CharacterStore`](dramatis_core::store::CharacterStore): the JSON
//! endpoints for the five roster operations, a health probe, and the `/ws`
//! live change feed. Transport concerns (TLS, reverse proxying, static
//! assets for the roster page) belong to the deployment, not this crate.

pub mod characters;
pub mod error;
pub mod feed;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json,
  Router,
  extract::State,
  routing::get,
};
use dramatis_core::store::CharacterStore;
use dramatis_roster::RosterService;
use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// `DRAMATIS_*` environment.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Shared moderator override accepted wherever a record secret is.
  pub admin_secret:       String,
  /// Seconds between liveness sweeps over the viewer set.
  #[serde(default = "default_ping_interval_secs")]
  pub ping_interval_secs: u64,
}

fn default_ping_interval_secs() -> u64 { 30 }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CharacterStore> {
  pub service: Arc<RosterService<S>>,
  pub config:  Arc<ServerConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CharacterStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/api/characters",
      get(characters::list::<S>).post(characters::create::<S>),
    )
    .route(
      "/api/characters/{name}",
      get(characters::show::<S>)
        .patch(characters::edit::<S>)
        .delete(characters::remove::<S>),
    )
    .route("/api/health", get(health::<S>))
    .route("/ws", get(feed::handler::<S>))
    .with_state(state)
}

/// `GET /api/health`
async fn health<S>(State(state): State<AppState<S>>) -> Json<serde_json::Value>
where
  S: CharacterStore + Clone + Send + Sync + 'static,
{
  Json(serde_json::json!({
    "status":  "ok",
    "viewers": state.service.publisher().viewer_count(),
  }))
}

// ─── Integration tests ───────────────────────────────────────────────────────
