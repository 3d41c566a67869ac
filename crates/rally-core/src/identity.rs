//! Identity of the authenticated caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of an authenticated user.
///
/// Identities are resolved by an [`Authenticator`](crate::store::Authenticator)
/// and recorded as the `owner` of every document a user creates.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct Identity(pub Uuid);

impl Identity {
  pub fn new_v4() -> Self { Self(Uuid::new_v4()) }

  pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl From<Uuid> for Identity {
  fn from(id: Uuid) -> Self { Self(id) }
}

impl fmt::Display for Identity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "user {}", self.0)
  }
}
