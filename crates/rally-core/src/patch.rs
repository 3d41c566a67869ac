//! Building new documents from client payloads and applying partial
//! updates to stored ones.
//!
//! Both operations work on the JSON body of a document: client fields are
//! merged into it, store-managed fields are forced, and the result is
//! deserialized back into the typed document and validated.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Document, Error, Identity, Result, sanitize::remove_blanks};

/// Fields a client can never set; the store and the requester decide them.
pub const MANAGED_FIELDS: &[&str] = &["id", "owner", "created_at", "updated_at"];

fn strip_managed(fields: &mut Map<String, Value>) {
  for key in MANAGED_FIELDS {
    fields.remove(*key);
  }
}

fn into_document<D: Document>(body: Map<String, Value>) -> Result<D> {
  D::check_fields(&body)?;
  let doc: D = serde_json::from_value(Value::Object(body))
    .map_err(|e| Error::validation(D::KIND, e.to_string()))?;
  doc.validate()?;
  Ok(doc)
}

/// Build a new document owned by `owner` from client-supplied `fields`.
///
/// Any `owner` (or other managed field) in `fields` is discarded. Blank
/// fields are not stripped, so a blank required field fails validation.
pub fn build_document<D: Document>(
  owner: Identity,
  mut fields: Map<String, Value>,
  now: DateTime<Utc>,
) -> Result<D> {
  strip_managed(&mut fields);
  fields.insert("id".into(), serde_json::to_value(Uuid::new_v4())?);
  fields.insert("owner".into(), serde_json::to_value(owner)?);
  fields.insert("created_at".into(), serde_json::to_value(now)?);
  fields.insert("updated_at".into(), serde_json::to_value(now)?);
  into_document(fields)
}

/// Reduce a raw update payload to the fields a client may change.
fn clean_patch(patch: Map<String, Value>) -> Map<String, Value> {
  let mut patch = remove_blanks(patch);
  strip_managed(&mut patch);
  patch
}

/// Shallow-merge `patch` into `doc`, returning the updated document.
///
/// Blank entries and store-managed fields are dropped from `patch` first,
/// so the raw client payload is passed as-is. Ownership must already have
/// been checked by the caller.
pub fn apply_patch<D: Document>(
  doc: &D,
  patch: Map<String, Value>,
  now: DateTime<Utc>,
) -> Result<D> {
  let patch = clean_patch(patch);

  let mut body = match serde_json::to_value(doc)? {
    Value::Object(body) => body,
    _ => return Err(Error::validation(D::KIND, "document is not an object")),
  };
  for key in D::displaced_keys(&patch) {
    body.remove(*key);
  }
  body.extend(patch);
  body.insert("updated_at".into(), serde_json::to_value(now)?);

  into_document(body)
}
