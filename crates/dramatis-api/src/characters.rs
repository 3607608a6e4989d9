//! Handlers for the `/api/characters` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/characters` | Public fields of every record |
//! | `POST`   | `/api/characters` | Body: `NewCharacter` JSON |
//! | `GET`    | `/api/characters/{name}` | Exact name or unique prefix |
//! | `PATCH`  | `/api/characters/{name}` | Body carries the secret + changes |
//! | `DELETE` | `/api/characters/{name}` | Body carries the secret |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use dramatis_core::{
  character::{CharacterPatch, CharacterProfile, Demographics, NewCharacter},
  store::CharacterStore,
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /api/characters`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<CharacterProfile>>, ApiError>
where
  S: CharacterStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.service.list().await?))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /api/characters`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewCharacter>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CharacterStore + Clone + Send + Sync + 'static,
{
  let profile = state.service.create(body).await?;
  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Show ────────────────────────────────────────────────────────────────────

/// `GET /api/characters/{name}` — exact name, or a prefix that resolves to a
/// single character.
pub async fn show<S>(
  State(state): State<AppState<S>>,
  Path(name): Path<String>,
) -> Result<Json<CharacterProfile>, ApiError>
where
  S: CharacterStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.service.show(&name).await?))
}

// ─── Edit ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub secret:       String,
  #[serde(default)]
  pub faceclaim:    Option<String>,
  #[serde(default)]
  pub image:        Option<String>,
  #[serde(default)]
  pub bio:          Option<String>,
  #[serde(default)]
  pub demographics: Option<Demographics>,
}

/// `PATCH /api/characters/{name}` — only the provided fields change.
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  Path(name): Path<String>,
  Json(body): Json<EditBody>,
) -> Result<Json<CharacterProfile>, ApiError>
where
  S: CharacterStore + Clone + Send + Sync + 'static,
{
  let patch = CharacterPatch {
    faceclaim:    body.faceclaim,
    image:        body.image,
    bio:          body.bio,
    demographics: body.demographics,
  };
  Ok(Json(state.service.edit(&name, &body.secret, patch).await?))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteBody {
  pub secret: String,
}

/// `DELETE /api/characters/{name}`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  Path(name): Path<String>,
  Json(body): Json<DeleteBody>,
) -> Result<StatusCode, ApiError>
where
  S: CharacterStore + Clone + Send + Sync + 'static,
{
  state.service.delete(&name, &body.secret).await?;
  Ok(StatusCode::NO_CONTENT)
}
