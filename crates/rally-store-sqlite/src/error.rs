//! Error type for `rally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A user row could not be read back after it was written.
  #[error("user {0:?} vanished during registration")]
  UserVanished(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
