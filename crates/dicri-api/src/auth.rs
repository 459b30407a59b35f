//! HTTP Basic-auth extractor resolving the request's [`Actor`].
//!
//! The username is the user's email; the password is checked against the
//! argon2 PHC string stored for that user.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use dicri_core::{store::CaseStore, user::Actor};
use rand_core::OsRng;

use crate::{AppState, error::ApiError};

/// The authenticated actor performing the request.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

/// Split a `Basic` authorization header into `(email, password)`.
fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (email, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((email.to_owned(), password.to_owned()))
}

/// Check `password` against a stored PHC string.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
  PasswordHash::new(password_hash)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}

/// Hash `password` into an argon2 PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Resolve the actor for a request's headers.
pub async fn authenticate<S>(headers: &HeaderMap, state: &AppState<S>) -> Result<Actor, ApiError>
where
  S: CaseStore,
{
  let (email, password) = basic_credentials(headers)?;

  let creds = state
    .service
    .store()
    .fetch_credentials(&email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  match creds {
    Some(creds) if verify_password(&password, &creds.password_hash) => Ok(creds.user.actor()),
    _ => {
      tracing::debug!(%email, "authentication failed");
      Err(ApiError::Unauthorized)
    }
  }
}

impl<S> FromRequestParts<AppState<S>> for CurrentActor
where
  S: CaseStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    authenticate(&parts.headers, state).await.map(CurrentActor)
  }
}
