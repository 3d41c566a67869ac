//! Generic CRUD handlers shared by every document kind.
//!
//! | Method   | Path                 | Success |
//! |----------|----------------------|---------|
//! | `GET`    | `/{plural}`          | 200 `{plural: [...]}` |
//! | `GET`    | `/{plural}/{id}`     | 200 `{singular: {...}}` |
//! | `POST`   | `/{plural}`          | per [`MutationReply`](rally_core::MutationReply) |
//! | `PATCH`  | `/{plural}/{id}`     | per [`MutationReply`](rally_core::MutationReply) |
//! | `DELETE` | `/{plural}/{id}`     | per [`MutationReply`](rally_core::MutationReply) |
//!
//! Every handler requires a [`Requester`]. Writes check existence first,
//! then ownership, and only then touch the store.

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  response::Response,
};
use chrono::Utc;
use rally_core::{
  Document,
  guard::{require_found, require_owner},
  patch::{apply_patch, build_document},
  store::{Authenticator, DocumentStore},
};
use serde_json::Value;
use uuid::Uuid;

use super::{ensure_parent, envelope, mutation_reply, unwrap_envelope};
use crate::{AppState, auth::Requester, error::ApiError};

/// Load a document by id, failing with `404` if it does not exist.
pub(crate) async fn load<S, D>(store: &S, id: Uuid) -> Result<D, ApiError>
where
  S: DocumentStore,
  D: Document,
{
  let found = store
    .find_by_id::<D>(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(require_found(found, D::KIND, id)?)
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /{plural}`: every document of the kind, whoever owns it.
pub async fn list<S, A, D>(
  State(state): State<AppState<S, A>>,
  Requester(_): Requester,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore + 'static,
  A: Authenticator + 'static,
  D: Document,
{
  let docs: Vec<D> = state
    .store
    .find_all::<D>()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  envelope(D::KIND.plural(), docs)
}

// ─── Show ─────────────────────────────────────────────────────────────────────

/// `GET /{plural}/{id}`
pub async fn show<S, A, D>(
  State(state): State<AppState<S, A>>,
  Requester(_): Requester,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore + 'static,
  A: Authenticator + 'static,
  D: Document,
{
  let Path(id) = id?;
  let doc: D = load(&*state.store, id).await?;
  envelope(D::KIND.singular(), doc)
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /{plural}`, body: `{"<singular>": {...}}`.
///
/// The owner is always the requester; an `owner` in the body is ignored.
pub async fn create<S, A, D>(
  State(state): State<AppState<S, A>>,
  Requester(requester): Requester,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError>
where
  S: DocumentStore + 'static,
  A: Authenticator + 'static,
  D: Document,
{
  let Json(body) = body?;
  let fields = unwrap_envelope(D::KIND, body)?;
  let doc: D = build_document(requester, fields, Utc::now())?;

  if let Some(parent) = doc.parent() {
    ensure_parent(&*state.store, parent).await?;
  }

  let doc = state
    .store
    .insert(doc)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  tracing::debug!(kind = %D::KIND, id = %doc.id(), owner = %requester, "created");

  mutation_reply(&*state.store, Some(&doc)).await
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /{plural}/{id}`, body: `{"<singular>": {...partial}}`.
///
/// Blank fields and store-managed fields (`id`, `owner`, timestamps) are
/// dropped from the payload before it is applied.
pub async fn update<S, A, D>(
  State(state): State<AppState<S, A>>,
  Requester(requester): Requester,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError>
where
  S: DocumentStore + 'static,
  A: Authenticator + 'static,
  D: Document,
{
  let Path(id) = id?;
  let Json(body) = body?;
  let patch = unwrap_envelope(D::KIND, body)?;

  let doc: D = load(&*state.store, id).await?;
  require_owner(requester, &doc)?;

  let updated = apply_patch(&doc, patch, Utc::now())?;
  if let Some(parent) = updated.parent()
    && doc.parent() != Some(parent)
  {
    ensure_parent(&*state.store, parent).await?;
  }

  let stored = state
    .store
    .update(updated)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !stored {
    return Err(rally_core::Error::NotFound { kind: D::KIND, id }.into());
  }
  tracing::debug!(kind = %D::KIND, %id, "updated");

  mutation_reply::<S, D>(&*state.store, None).await
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /{plural}/{id}`
pub async fn delete<S, A, D>(
  State(state): State<AppState<S, A>>,
  Requester(requester): Requester,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, ApiError>
where
  S: DocumentStore + 'static,
  A: Authenticator + 'static,
  D: Document,
{
  let Path(id) = id?;

  let doc: D = load(&*state.store, id).await?;
  require_owner(requester, &doc)?;

  let removed = state
    .store
    .delete::<D>(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if !removed {
    return Err(rally_core::Error::NotFound { kind: D::KIND, id }.into());
  }
  tracing::debug!(kind = %D::KIND, %id, "deleted");

  mutation_reply::<S, D>(&*state.store, None).await
}
