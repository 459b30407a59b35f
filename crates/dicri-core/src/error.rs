//! Error types for `dicri-core`.

use thiserror::Error;

/// Every way a workflow operation can end without effect.
///
/// None of these are retried; the caller renders the kind and message.
#[derive(Debug, Error)]
pub enum Error {
  /// The actor may not perform the operation. Carries no detail so the
  /// record's contents are never echoed back to an unauthorized caller.
  #[error("forbidden")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("invalid transition: {0}")]
  InvalidTransition(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
