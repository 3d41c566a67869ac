//! Attendance lookups by parent.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/attendances` | Optional `?parent=<event or hangout id>` |
//! | `GET`  | `/events/{id}/attendances` | 404 if the event does not exist |
//! | `GET`  | `/hangouts/{id}/attendances` | 404 if the hangout does not exist |
//!
//! Listings narrowed to one parent show who is coming: their `owner` is
//! expanded to `{"id": ..., "email": ...}`.

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{PathRejection, QueryRejection},
  },
};
use rally_core::{
  Attendance, Document, Identity, ResourceKind,
  store::{Authenticator, DocumentStore},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::{envelope, resource::load};
use crate::{AppState, auth::Requester, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Restrict to attendances of this event or hangout.
  pub parent: Option<Uuid>,
}

/// `GET /attendances[?parent=<id>]`
pub async fn list<S, A>(
  State(state): State<AppState<S, A>>,
  Requester(_): Requester,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore + 'static,
  A: Authenticator + 'static,
{
  let Query(params) = params?;
  let plural = ResourceKind::Attendance.plural();

  match params.parent {
    Some(parent) => {
      let attendances = state
        .store
        .find_by_parent::<Attendance>(parent)
        .await
        .map_err(|e| ApiError::Store(Box::new(e)))?;
      envelope(plural, with_owner_emails(&*state.auth, attendances).await?)
    }
    None => {
      let attendances = state
        .store
        .find_all::<Attendance>()
        .await
        .map_err(|e| ApiError::Store(Box::new(e)))?;
      envelope(plural, attendances)
    }
  }
}

/// `GET /{events|hangouts}/{id}/attendances`: attendances of parent `P`.
pub async fn by_parent<S, A, P>(
  State(state): State<AppState<S, A>>,
  Requester(_): Requester,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: DocumentStore + 'static,
  A: Authenticator + 'static,
  P: Document,
{
  let Path(id) = id?;
  load::<S, P>(&*state.store, id).await?;

  let mut attendances: Vec<Attendance> = state
    .store
    .find_by_parent::<Attendance>(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  attendances.retain(|a| a.parent.kind() == P::KIND);

  envelope(
    ResourceKind::Attendance.plural(),
    with_owner_emails(&*state.auth, attendances).await?,
  )
}

/// Render `attendances` with each `owner` replaced by the owner's id and
/// email. The email is `null` for owners with no known user.
async fn with_owner_emails<A: Authenticator>(
  auth: &A,
  attendances: Vec<Attendance>,
) -> Result<Vec<Value>, ApiError> {
  let mut owners: Vec<Identity> = attendances.iter().map(|a| a.owner).collect();
  owners.sort();
  owners.dedup();

  let emails = auth
    .emails_of(&owners)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  attendances
    .into_iter()
    .map(|attendance| -> Result<Value, ApiError> {
      let mut value = serde_json::to_value(&attendance)?;
      if let Value::Object(body) = &mut value {
        body.insert(
          "owner".into(),
          json!({ "id": attendance.owner, "email": emails.get(&attendance.owner) }),
        );
      }
      Ok(value)
    })
    .collect()
}
