//! The `DocumentStore` and `Authenticator` traits.
//!
//! Both are implemented by storage backends (e.g. `rally-store-sqlite`).
//! The API layer depends on these abstractions and receives concrete
//! implementations by injection, never through globals.

use std::{collections::HashMap, future::Future};

use uuid::Uuid;

use crate::{Document, Identity};

// ─── Documents ───────────────────────────────────────────────────────────────

/// A document database addressed by resource kind and identifier.
///
/// The store performs no access control: existence and ownership are checked
/// by the caller with [`crate::guard`] before any write.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All documents of kind `D`, in insertion order.
  fn find_all<D: Document>(
    &self,
  ) -> impl Future<Output = Result<Vec<D>, Self::Error>> + Send + '_;

  /// Retrieve a document by id. Returns `None` if not found.
  fn find_by_id<D: Document>(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<D>, Self::Error>> + Send + '_;

  /// All documents of kind `D` whose parent reference points at `parent`.
  fn find_by_parent<D: Document>(
    &self,
    parent: Uuid,
  ) -> impl Future<Output = Result<Vec<D>, Self::Error>> + Send + '_;

  /// Persist a newly built document and return it.
  fn insert<D: Document>(
    &self,
    doc: D,
  ) -> impl Future<Output = Result<D, Self::Error>> + Send + '_;

  /// Overwrite the stored document with the same id.
  ///
  /// Returns `false` if no such document exists (e.g. it was deleted since
  /// it was read).
  fn update<D: Document>(
    &self,
    doc: D,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Delete a document by id. Returns `false` if it did not exist.
  fn delete<D: Document>(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Authentication ──────────────────────────────────────────────────────────

/// Resolves bearer tokens to identities and identities to users.
///
/// Implementations only ever see the token's digest; the raw token is never
/// stored.
pub trait Authenticator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up the identity holding the token with this digest.
  fn identify<'a>(
    &'a self,
    token_digest: &'a str,
  ) -> impl Future<Output = Result<Option<Identity>, Self::Error>> + Send + 'a;

  /// Email addresses of the given users. Identities with no known user are
  /// absent from the map.
  fn emails_of<'a>(
    &'a self,
    identities: &'a [Identity],
  ) -> impl Future<Output = Result<HashMap<Identity, String>, Self::Error>> + Send + 'a;
}
