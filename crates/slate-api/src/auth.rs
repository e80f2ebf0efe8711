//! HTTP Basic authentication against stored argon2 hashes.

use std::sync::Arc;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand_core::OsRng;
use slate_core::{access::Caller, gradebook::store_err, store::SchoolStore};

use crate::error::ApiError;

/// The authenticated caller. Taking this in a handler makes the route
/// require valid credentials.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Caller);

/// Split a `Basic` authorization header into `(login, password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

  let (login, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((login.to_string(), password.to_string()))
}

/// Hash `password` into a PHC string for storage.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Server(format!("argon2 error: {e}").into()))
}

/// `true` if `password` matches the stored PHC string.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    .unwrap_or(false)
}

impl<S> FromRequestParts<Arc<S>> for Authenticated
where
  S: SchoolStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, store: &Arc<S>) -> Result<Self, Self::Rejection> {
    let (login, password) = basic_credentials(&parts.headers)?;

    let Some(credential) = store
      .find_credential(login.clone())
      .await
      .map_err(store_err)?
    else {
      tracing::debug!(%login, "unknown login");
      return Err(ApiError::Unauthorized);
    };

    if !verify_password(&password, &credential.password_hash) {
      tracing::debug!(%login, "password mismatch");
      return Err(ApiError::Unauthorized);
    }

    Ok(Authenticated(credential.into_caller()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::Request;

  fn headers_with(value: &str) -> HeaderMap {
    let req = Request::builder()
      .header(header::AUTHORIZATION, value)
      .body(())
      .unwrap();
    req.headers().clone()
  }

  #[test]
  fn parses_basic_header() {
    let value = format!("Basic {}", B64.encode("ada@school.test:pa:ss"));
    let (login, password) = basic_credentials(&headers_with(&value)).unwrap();
    assert_eq!(login, "ada@school.test");
    assert_eq!(password, "pa:ss");
  }

  #[test]
  fn rejects_malformed_headers() {
    let no_colon = format!("Basic {}", B64.encode("nocolon"));
    for value in ["Bearer abc", "Basic !!!not-base64!!!", no_colon.as_str()] {
      assert!(matches!(basic_credentials(&headers_with(value)), Err(ApiError::Unauthorized)));
    }
    assert!(matches!(basic_credentials(&HeaderMap::new()), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn hash_then_verify() {
    let phc = hash_password("secret").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("secret", &phc));
    assert!(!verify_password("wrong", &phc));
    assert!(!verify_password("secret", "not-a-phc-string"));
  }
}
