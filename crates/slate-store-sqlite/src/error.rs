//! Error type for `slate-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] slate_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A UNIQUE, CHECK or FOREIGN KEY constraint rejected the write.
  #[error("constraint violated: {0}")]
  Constraint(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {kind} value: {value:?}")]
  UnknownValue { kind: &'static str, value: String },
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, msg))
        if failure.code == ErrorCode::ConstraintViolation =>
      {
        Error::Constraint(msg.unwrap_or_else(|| failure.to_string()))
      }
      tokio_rusqlite::Error::Other(e) => match e.downcast::<slate_core::Error>() {
        Ok(core) => Error::Core(*core),
        Err(e) => Error::Database(tokio_rusqlite::Error::Other(e)),
      },
      other => Error::Database(other),
    }
  }
}

/// Abort a `conn.call` closure with a domain error, rolling back any open
/// transaction.
pub(crate) fn refuse(e: slate_core::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

impl From<Error> for slate_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::Constraint(msg) => slate_core::Error::Conflict(msg),
      other => slate_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
