//! Existence and ownership checks applied before every read-by-id and
//! every mutation.
//!
//! Both checks only classify; they never touch the store. Failures are typed
//! so handlers can propagate them with `?`.

use uuid::Uuid;

use crate::{Document, Error, Identity, ResourceKind, Result};

/// Unwrap the result of a by-id lookup, or fail with [`Error::NotFound`].
pub fn require_found<T>(found: Option<T>, kind: ResourceKind, id: Uuid) -> Result<T> {
  found.ok_or(Error::NotFound { kind, id })
}

/// Fail with [`Error::Forbidden`] unless `requester` owns `doc`.
pub fn require_owner<D: Document>(requester: Identity, doc: &D) -> Result<()> {
  if doc.owner() == requester {
    Ok(())
  } else {
    Err(Error::Forbidden {
      kind: D::KIND,
      id: doc.id(),
      requester,
    })
  }
}
