pub mod attendances;
pub mod resource;

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use rally_core::{
  Document, Event, Hangout, MutationReply, ParentRef, ResourceKind,
  store::DocumentStore,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Wrap `value` as `{"<key>": value}`.
pub(crate) fn envelope(key: &str, value: impl Serialize) -> Result<Json<Value>, ApiError> {
  let mut map = Map::new();
  map.insert(key.to_owned(), serde_json::to_value(value)?);
  Ok(Json(Value::Object(map)))
}

/// Take the fields object out of a `{"<singular>": {...}}` request body.
pub(crate) fn unwrap_envelope(
  kind: ResourceKind,
  body: Value,
) -> Result<Map<String, Value>, ApiError> {
  let key = kind.singular();
  let Value::Object(mut outer) = body else {
    return Err(ApiError::BadRequest("request body must be a JSON object".into()));
  };
  match outer.remove(key) {
    Some(Value::Object(fields)) => Ok(fields),
    Some(_) => Err(ApiError::BadRequest(format!("`{key}` must be an object"))),
    None => Err(ApiError::BadRequest(format!("request body has no `{key}`"))),
  }
}

/// Answer a successful write according to `D::MUTATION_REPLY`.
///
/// `item` is the document to echo with `201` (create); `None` means `204`.
pub(crate) async fn mutation_reply<S, D>(
  store: &S,
  item: Option<&D>,
) -> Result<Response, ApiError>
where
  S: DocumentStore,
  D: Document,
{
  match D::MUTATION_REPLY {
    MutationReply::Item => match item {
      Some(doc) => {
        Ok((StatusCode::CREATED, envelope(D::KIND.singular(), doc)?).into_response())
      }
      None => Ok(StatusCode::NO_CONTENT.into_response()),
    },
    MutationReply::Collection => {
      let all = store
        .find_all::<D>()
        .await
        .map_err(|e| ApiError::Store(Box::new(e)))?;
      Ok((StatusCode::OK, envelope(D::KIND.plural(), all)?).into_response())
    }
  }
}

/// Reject writes that point an attendance at a parent that does not exist.
pub(crate) async fn ensure_parent<S: DocumentStore>(
  store: &S,
  parent: ParentRef,
) -> Result<(), ApiError> {
  let exists = match parent {
    ParentRef::Event(id) => store
      .find_by_id::<Event>(id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .is_some(),
    ParentRef::Hangout(id) => store
      .find_by_id::<Hangout>(id)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .is_some(),
  };

  if exists {
    Ok(())
  } else {
    Err(ApiError::ValidationFailed(format!(
      "{} {} does not exist",
      parent.kind(),
      parent.id()
    )))
  }
}
