//! Handlers for the user directory and `/me`.
//!
//! Request bodies carry a plaintext `password`; it is hashed here and only the
//! PHC string reaches the store.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use dicri_core::{
  lookup::{Role, RoleId},
  store::CaseStore,
  user::{NewUser, User, UserId, UserPatch},
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  auth::{CurrentActor, hash_password},
  error::ApiError,
};

// ─── Directory ────────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.list_users(&actor).await?))
}

/// `GET /users/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.get_user(&actor, id).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub email:    String,
  pub name:     String,
  pub role_id:  Option<RoleId>,
  pub password: String,
}

/// `POST /users`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password must not be empty".into()));
  }
  let input = NewUser {
    email:         body.email.trim().to_owned(),
    name:          body.name,
    role_id:       body.role_id,
    password_hash: hash_password(&body.password)?,
  };
  let user = state.service.create_user(&actor, input).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Update / delete ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  pub email:    Option<String>,
  pub name:     Option<String>,
  /// `null` strips the role.
  #[serde(default, deserialize_with = "dicri_core::patch::nullable")]
  pub role_id:  Option<Option<RoleId>>,
  pub password: Option<String>,
}

/// `PUT /users/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<UserId>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<User>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  let password_hash = match body.password.as_deref() {
    Some("") => return Err(ApiError::BadRequest("password must not be empty".into())),
    Some(password) => Some(hash_password(password)?),
    None => None,
  };
  let patch = UserPatch {
    email: body.email.map(|e| e.trim().to_owned()),
    name: body.name,
    role_id: body.role_id,
    password_hash,
  };
  Ok(Json(state.service.update_user(&actor, id, patch).await?))
}

/// `DELETE /users/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<UserId>,
) -> Result<StatusCode, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  state.service.delete_user(&actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Me ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Me {
  pub id:      UserId,
  pub role_id: Option<RoleId>,
  /// `None` when the role id does not resolve; such an actor is refused
  /// everywhere else.
  pub role:    Option<Role>,
}

/// `GET /me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Json<Me>
where
  S: CaseStore + Clone + 'static,
{
  Json(Me {
    id:      actor.id,
    role_id: actor.role_id,
    role:    state.service.registry().role_of(&actor),
  })
}
