//! Identity and admin-token extractors.
//!
//! End-user authentication is delegated: the identity-aware reverse proxy
//! in front of this service verifies the session and injects the caller's
//! id as the `x-user-id` header. This service trusts that header and never
//! sees a credential. The admin surface is the exception — it verifies a
//! bearer token against an argon2 hash from the server configuration.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use kindred_core::{store::SwipeStore, swipe::UserId};

use crate::{AppState, error::ApiError};

/// Header carrying the authenticated caller id, set by the proxy.
pub const USER_ID_HEADER: &str = "x-user-id";

// ─── End-user identity ───────────────────────────────────────────────────────

/// The authenticated caller. Present in a handler signature means the
/// request carried a non-empty identity header.
pub struct AuthedUser(pub UserId);

impl<S> FromRequestParts<AppState<S>> for AuthedUser
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let raw = parts
      .headers
      .get(USER_ID_HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or(ApiError::Unauthorized)?;

    let user = UserId::new(raw).map_err(|_| ApiError::Unauthorized)?;
    Ok(AuthedUser(user))
  }
}

// ─── Admin token ─────────────────────────────────────────────────────────────

/// Admin credentials accepted by this server instance.
#[derive(Clone, Default)]
pub struct AdminAuth {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`.
  /// `None` disables the admin surface entirely.
  pub token_hash: Option<String>,
}

/// Zero-size marker: present in the handler means the request carried a
/// valid admin bearer token.
pub struct Admin;

/// Verify the bearer token directly from headers.
pub fn verify_admin(headers: &HeaderMap, auth: &AdminAuth) -> Result<(), ApiError> {
  let hash = auth.token_hash.as_deref().ok_or(ApiError::Unauthorized)?;

  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let token = header_val
    .strip_prefix("Bearer ")
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(hash).map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(token.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(())
}

impl<S> FromRequestParts<AppState<S>> for Admin
where
  S: SwipeStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_admin(&parts.headers, &state.admin)?;
    Ok(Admin)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::header;
  use rand_core::OsRng;

  fn auth_for(token: &str) -> AdminAuth {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(token.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AdminAuth { token_hash: Some(hash) }
  }

  fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, value.parse().unwrap());
    headers
  }

  #[test]
  fn correct_token_accepted() {
    let auth = auth_for("s3cret");
    assert!(verify_admin(&headers_with("Bearer s3cret"), &auth).is_ok());
  }

  #[test]
  fn wrong_token_rejected() {
    let auth = auth_for("s3cret");
    assert!(verify_admin(&headers_with("Bearer nope"), &auth).is_err());
  }

  #[test]
  fn missing_header_rejected() {
    let auth = auth_for("s3cret");
    assert!(verify_admin(&HeaderMap::new(), &auth).is_err());
  }

  #[test]
  fn non_bearer_scheme_rejected() {
    let auth = auth_for("s3cret");
    assert!(verify_admin(&headers_with("Basic s3cret"), &auth).is_err());
  }

  #[test]
  fn unconfigured_admin_rejects_everything() {
    let auth = AdminAuth::default();
    assert!(verify_admin(&headers_with("Bearer s3cret"), &auth).is_err());
  }
}
