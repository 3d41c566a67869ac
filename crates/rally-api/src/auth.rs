//! Bearer-token extractor and token helpers.
//!
//! Tokens are random 256-bit values rendered as hex. Only their SHA-256
//! digest is handed to the [`Authenticator`].

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use rally_core::{
  Identity,
  store::{Authenticator, DocumentStore},
};
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest as _, Sha256};

use crate::{AppState, error::ApiError};

/// The authenticated caller. Extracting it rejects the request with `401`
/// before any handler logic runs.
#[derive(Debug, Clone, Copy)]
pub struct Requester(pub Identity);

/// Generate a fresh bearer token.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// The digest under which a token is stored.
pub fn digest_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthenticated)?;

  let (scheme, token) = value.split_once(' ').ok_or(ApiError::Unauthenticated)?;
  if !scheme.eq_ignore_ascii_case("bearer") {
    return Err(ApiError::Unauthenticated);
  }

  let token = token.trim();
  if token.is_empty() {
    return Err(ApiError::Unauthenticated);
  }
  Ok(token)
}

impl<S, A> FromRequestParts<AppState<S, A>> for Requester
where
  S: DocumentStore + 'static,
  A: Authenticator + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, A>,
  ) -> Result<Self, Self::Rejection> {
    let digest = digest_token(bearer_token(&parts.headers)?);
    let identity = state
      .auth
      .identify(&digest)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?
      .ok_or(ApiError::Unauthenticated)?;
    Ok(Requester(identity))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(authorization: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(
      header::AUTHORIZATION,
      HeaderValue::from_str(authorization).unwrap(),
    );
    map
  }

  #[test]
  fn extracts_bearer_token() {
    assert_eq!(bearer_token(&headers("Bearer abc123")).unwrap(), "abc123");
    assert_eq!(bearer_token(&headers("bearer abc123")).unwrap(), "abc123");
  }

  #[test]
  fn rejects_other_schemes_and_blank_tokens() {
    for value in ["Basic dXNlcjpwYXNz", "Bearer ", "Bearer", "abc123"] {
      assert!(
        matches!(bearer_token(&headers(value)), Err(ApiError::Unauthenticated)),
        "{value:?} should be rejected"
      );
    }
  }

  #[test]
  fn missing_header_is_unauthenticated() {
    assert!(matches!(
      bearer_token(&HeaderMap::new()),
      Err(ApiError::Unauthenticated)
    ));
  }

  #[test]
  fn tokens_are_unique_and_digests_stable() {
    let a = generate_token();
    let b = generate_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 64);
    assert_eq!(digest_token(&a), digest_token(&a));
    assert_ne!(digest_token(&a), a);
  }
}
