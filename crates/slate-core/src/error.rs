//! Error types for `slate-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The caller's role or ownership does not permit the operation.
  #[error("unauthorized")]
  Unauthorized,

  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: Uuid },

  /// A required field is missing or malformed.
  #[error("validation failed: {0}")]
  Validation(String),

  /// A uniqueness constraint would be violated.
  #[error("conflict: {0}")]
  Conflict(String),

  /// A collaborator (usually the store) failed.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(kind: &'static str, id: Uuid) -> Self {
    Self::NotFound { kind, id }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
