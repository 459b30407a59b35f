//! Users and the actor a request runs as.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lookup::RoleId;

pub type UserId = i64;

/// The authenticated identity performing an operation.
///
/// Supplied by the session layer on every call; the core never looks it up
/// from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub id:      UserId,
  pub role_id: Option<RoleId>,
}

/// A directory entry. The password hash is never part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         UserId,
  pub email:      String,
  pub name:       String,
  pub role_id:    Option<RoleId>,
  pub created_at: DateTime<Utc>,
}

impl User {
  pub fn actor(&self) -> Actor {
    Actor { id: self.id, role_id: self.role_id }
  }
}

/// What authentication needs to check a login.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  /// argon2 PHC string.
  pub password_hash: String,
}

/// Input to [`crate::store::CaseStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub name:          String,
  pub role_id:       Option<RoleId>,
  pub password_hash: String,
}

/// Partial update of a user; `None` leaves a field unchanged and
/// `role_id: Some(None)` strips the role.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
  pub email:         Option<String>,
  pub name:          Option<String>,
  #[serde(default, deserialize_with = "crate::patch::nullable")]
  pub role_id:       Option<Option<RoleId>>,
  #[serde(skip)]
  pub password_hash: Option<String>,
}
