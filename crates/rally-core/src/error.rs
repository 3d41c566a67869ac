//! Error types for `rally-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::{document::ResourceKind, identity::Identity};

#[derive(Debug, Error)]
pub enum Error {
  #[error("{kind} {id} not found")]
  NotFound { kind: ResourceKind, id: Uuid },

  #[error("{requester} does not own {kind} {id}")]
  Forbidden {
    kind:      ResourceKind,
    id:        Uuid,
    requester: Identity,
  },

  #[error("{kind} validation failed: {reason}")]
  Validation { kind: ResourceKind, reason: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn validation(kind: ResourceKind, reason: impl Into<String>) -> Self {
    Self::Validation { kind, reason: reason.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
