//! [`SqliteStore`]: the SQLite implementation of [`DocumentStore`] and
//! [`Authenticator`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rally_core::{
  Document, Identity,
  store::{Authenticator, DocumentStore},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{DocumentRow, decode_body, decode_identity, encode_dt, encode_kind, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rally document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
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

  /// Open an in-memory store, useful for testing.
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

  /// Run a `SELECT body_json ...` query and decode every row as `D`.
  async fn query_bodies<D: Document>(
    &self,
    sql: &'static str,
    params: Vec<String>,
  ) -> Result<Vec<D>> {
    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    bodies.iter().map(|b| decode_body(b)).collect()
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// Create the user `email` if needed and make `token_digest` its only
  /// valid token. Returns the user's identity.
  pub async fn register_token(&self, email: &str, token_digest: &str) -> Result<Identity> {
    let new_id   = encode_uuid(Uuid::new_v4());
    let email    = email.to_owned();
    let digest   = token_digest.to_owned();
    let at_str   = encode_dt(Utc::now());
    let lookup   = email.clone();

    let user_id: Option<String> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, email, token_digest, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(email) DO UPDATE SET token_digest = excluded.token_digest",
          rusqlite::params![new_id, email, digest, at_str],
        )?;
        Ok(
          conn
            .query_row(
              "SELECT user_id FROM users WHERE email = ?1",
              rusqlite::params![email],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    let user_id = user_id.ok_or(Error::UserVanished(lookup))?;
    tracing::debug!(user = %user_id, "registered bearer token");
    decode_identity(&user_id)
  }

  /// Invalidate the token of user `email`. Returns `false` if there is no
  /// such user.
  pub async fn revoke_token(&self, email: &str) -> Result<bool> {
    let email = email.to_owned();
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET token_digest = NULL WHERE email = ?1",
          rusqlite::params![email],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn find_all<D: Document>(&self) -> Result<Vec<D>> {
    self
      .query_bodies(
        "SELECT body_json FROM documents WHERE kind = ?1 ORDER BY rowid",
        vec![encode_kind(D::KIND).to_owned()],
      )
      .await
  }

  async fn find_by_id<D: Document>(&self, id: Uuid) -> Result<Option<D>> {
    let id_str   = encode_uuid(id);
    let kind_str = encode_kind(D::KIND);

    let body: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT body_json FROM documents WHERE doc_id = ?1 AND kind = ?2",
              rusqlite::params![id_str, kind_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    body.as_deref().map(decode_body).transpose()
  }

  async fn find_by_parent<D: Document>(&self, parent: Uuid) -> Result<Vec<D>> {
    self
      .query_bodies(
        "SELECT body_json FROM documents
         WHERE kind = ?1 AND parent_id = ?2
         ORDER BY rowid",
        vec![encode_kind(D::KIND).to_owned(), encode_uuid(parent)],
      )
      .await
  }

  async fn insert<D: Document>(&self, doc: D) -> Result<D> {
    let row = DocumentRow::encode(&doc)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (
             doc_id, kind, owner_id, parent_id, body_json, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            row.doc_id,
            row.kind,
            row.owner_id,
            row.parent_id,
            row.body_json,
            row.created_at,
            row.updated_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(doc)
  }

  async fn update<D: Document>(&self, doc: D) -> Result<bool> {
    let row = DocumentRow::encode(&doc)?;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE documents
           SET parent_id = ?3, body_json = ?4, updated_at = ?5
           WHERE doc_id = ?1 AND kind = ?2",
          rusqlite::params![
            row.doc_id,
            row.kind,
            row.parent_id,
            row.body_json,
            row.updated_at,
          ],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete<D: Document>(&self, id: Uuid) -> Result<bool> {
    let id_str   = encode_uuid(id);
    let kind_str = encode_kind(D::KIND);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE doc_id = ?1 AND kind = ?2",
          rusqlite::params![id_str, kind_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }
}

// ─── Authenticator impl ──────────────────────────────────────────────────────

impl Authenticator for SqliteStore {
  type Error = Error;

  async fn identify(&self, token_digest: &str) -> Result<Option<Identity>> {
    let digest = token_digest.to_owned();

    let user_id: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id FROM users WHERE token_digest = ?1",
              rusqlite::params![digest],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    user_id.as_deref().map(decode_identity).transpose()
  }

  async fn emails_of(&self, identities: &[Identity]) -> Result<HashMap<Identity, String>> {
    if identities.is_empty() {
      return Ok(HashMap::new());
    }
    let ids: Vec<String> =
      identities.iter().map(|i| encode_uuid(i.as_uuid())).collect();

    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
          "SELECT user_id, email FROM users WHERE user_id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(user_id, email)| -> Result<(Identity, String)> {
        Ok((decode_identity(&user_id)?, email))
      })
      .collect()
  }
}
