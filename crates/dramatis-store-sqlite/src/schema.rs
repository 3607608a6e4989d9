//! SQL schema for the roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS characters (
    name         TEXT PRIMARY KEY,  -- case-sensitive storage
    faceclaim    TEXT NOT NULL,
    image        TEXT NOT NULL,
    bio          TEXT NOT NULL,
    secret       TEXT NOT NULL,     -- opaque owner credential
    demographics TEXT,              -- compact JSON or NULL
    created_at   TEXT NOT NULL      -- ISO 8601 UTC; store-assigned
);

-- Serves the case-insensitive prefix lookup and the roster ordering.
CREATE INDEX IF NOT EXISTS characters_name_nocase_idx
    ON characters(name COLLATE NOCASE);

PRAGMA user_version = 1;
";
