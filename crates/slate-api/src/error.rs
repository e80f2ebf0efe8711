//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Every variant renders as
/// `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Conflict(String),

  #[error("server error: {0}")]
  Server(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<slate_core::Error> for ApiError {
  fn from(e: slate_core::Error) -> Self {
    match e {
      slate_core::Error::Unauthorized => ApiError::Unauthorized,
      e @ slate_core::Error::NotFound { .. } => ApiError::NotFound(e.to_string()),
      slate_core::Error::Validation(m) => ApiError::Validation(m),
      slate_core::Error::Conflict(m) => ApiError::Conflict(m),
      slate_core::Error::Store(e) => ApiError::Server(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { ApiError::Validation(r.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self { ApiError::Validation(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { ApiError::Validation(r.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Server(e) => {
        tracing::error!(error = %e, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    let mut res = (status, axum::Json(json!({ "error": self.to_string() }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"slate\""),
      );
    }
    res
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  #[test]
  fn core_errors_map_to_statuses() {
    let cases = [
      (slate_core::Error::Unauthorized, StatusCode::UNAUTHORIZED),
      (slate_core::Error::not_found("student", Uuid::nil()), StatusCode::NOT_FOUND),
      (slate_core::Error::Validation("bad".into()), StatusCode::BAD_REQUEST),
      (slate_core::Error::Conflict("taken".into()), StatusCode::CONFLICT),
      (
        slate_core::Error::Store(Box::new(std::io::Error::other("disk"))),
        StatusCode::INTERNAL_SERVER_ERROR,
      ),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::from(err).into_response().status(), status);
    }
  }

  #[test]
  fn unauthorized_challenges_for_basic() {
    let res = ApiError::Unauthorized.into_response();
    let challenge = res.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert!(challenge.to_str().unwrap().starts_with("Basic"));
  }
}
