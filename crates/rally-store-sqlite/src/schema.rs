//! SQL schema for the Rally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per document, whatever its kind. The JSON body is authoritative;
-- owner_id and parent_id are copied out of it for lookups.
CREATE TABLE IF NOT EXISTS documents (
    doc_id      TEXT PRIMARY KEY,
    kind        TEXT NOT NULL,   -- 'event' | 'hangout' | 'attendance'
    owner_id    TEXT NOT NULL,
    parent_id   TEXT,            -- attendances only
    body_json   TEXT NOT NULL,
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at  TEXT NOT NULL
);

-- Only the SHA-256 digest of a bearer token is ever stored.
CREATE TABLE IF NOT EXISTS users (
    user_id      TEXT PRIMARY KEY,
    email        TEXT NOT NULL UNIQUE,
    token_digest TEXT UNIQUE,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS documents_kind_idx   ON documents(kind);
CREATE INDEX IF NOT EXISTS documents_parent_idx ON documents(parent_id);

PRAGMA user_version = 1;
";
