//! [`SqliteStore`] — the SQLite implementation of [`CharacterStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use dramatis_core::{
  character::{CharacterPatch, CharacterRecord, NewCharacter},
  store::{CharacterStore, CreateOutcome},
};

use crate::{
  Error, Result,
  encode::{RawCharacter, encode_demographics, encode_dt, like_prefix_pattern},
  schema::SCHEMA,
};

/// The `characters` columns in the order [`RawCharacter::from_row`] expects.
pub(crate) const COLUMNS: &str =
  "name, faceclaim, image, bio, secret, demographics, created_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A roster store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// run serially on the connection's thread, which is what makes the
/// uniqueness-check-plus-insert and read-modify-write paths atomic.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn select_one(&self, name: String) -> Result<Option<CharacterRecord>> {
    let raw: Option<RawCharacter> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM characters WHERE name = ?1"),
              rusqlite::params![name],
              RawCharacter::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCharacter::into_record).transpose()
  }
}

// ─── CharacterStore impl ─────────────────────────────────────────────────────

impl CharacterStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: NewCharacter) -> Result<CreateOutcome> {
    let record = CharacterRecord {
      name:         input.name,
      faceclaim:    input.faceclaim,
      image:        input.image,
      bio:          input.bio,
      secret:       input.secret,
      demographics: input.demographics,
      created_at:   Utc::now(),
    };

    let name             = record.name.clone();
    let faceclaim        = record.faceclaim.clone();
    let image            = record.image.clone();
    let bio              = record.bio.clone();
    let secret           = record.secret.clone();
    let demographics_str = record
      .demographics
      .as_ref()
      .map(encode_demographics)
      .transpose()?;
    let at_str           = encode_dt(record.created_at);

    // One INSERT; the primary key makes the uniqueness check atomic.
    let inserted: bool = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO characters
             (name, faceclaim, image, bio, secret, demographics, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            name,
            faceclaim,
            image,
            bio,
            secret,
            demographics_str,
            at_str,
          ],
        );
        match result {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if inserted {
      Ok(CreateOutcome::Created(record))
    } else {
      Ok(CreateOutcome::DuplicateName)
    }
  }

  async fn get(&self, name: &str) -> Result<Option<CharacterRecord>> {
    self.select_one(name.to_owned()).await
  }

  async fn find_by_prefix(
    &self,
    prefix: &str,
    limit: usize,
  ) -> Result<Vec<CharacterRecord>> {
    let pattern   = like_prefix_pattern(prefix);
    let limit_val = limit as i64;

    let raws: Vec<RawCharacter> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS} FROM characters
           WHERE name LIKE ?1 ESCAPE '\\'
           ORDER BY name COLLATE NOCASE
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![pattern, limit_val],
            RawCharacter::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCharacter::into_record).collect()
  }

  async fn update(
    &self,
    name: &str,
    patch: CharacterPatch,
  ) -> Result<Option<CharacterRecord>> {
    let demographics_str = patch
      .demographics
      .as_ref()
      .map(encode_demographics)
      .transpose()?;
    let faceclaim = patch.faceclaim;
    let image     = patch.image;
    let bio       = patch.bio;
    let name      = name.to_owned();

    // UPDATE and the SELECT of the result run in one serialized call, so no
    // other mutation on this name can interleave between them.
    let raw: Option<RawCharacter> = self
      .conn
      .call(move |conn| {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        if let Some(v) = faceclaim {
          sets.push("faceclaim = ?");
          values.push(v);
        }
        if let Some(v) = image {
          sets.push("image = ?");
          values.push(v);
        }
        if let Some(v) = bio {
          sets.push("bio = ?");
          values.push(v);
        }
        if let Some(v) = demographics_str {
          sets.push("demographics = ?");
          values.push(v);
        }

        // An empty patch still commits (a no-op) and returns the row.
        if !sets.is_empty() {
          let sql = format!(
            "UPDATE characters SET {} WHERE name = ?",
            sets.join(", ")
          );
          values.push(name.clone());
          conn.execute(&sql, rusqlite::params_from_iter(values))?;
        }

        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM characters WHERE name = ?1"),
              rusqlite::params![name],
              RawCharacter::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCharacter::into_record).transpose()
  }

  async fn delete(&self, name: &str) -> Result<bool> {
    let name = name.to_owned();

    let affected: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM characters WHERE name = ?1",
          rusqlite::params![name],
        )?)
      })
      .await?;

    Ok(affected > 0)
  }

  async fn list_all(&self) -> Result<Vec<CharacterRecord>> {
    let raws: Vec<RawCharacter> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS} FROM characters ORDER BY name COLLATE NOCASE"
        ))?;
        let rows = stmt
          .query_map([], RawCharacter::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCharacter::into_record).collect()
  }
}
