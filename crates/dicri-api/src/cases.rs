//! Handlers for `/cases` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/cases` | Optional `?view=open` for open cases only |
//! | `POST`   | `/cases` | Body: [`NewCase`] |
//! | `GET`    | `/cases/{id}` | |
//! | `PUT`    | `/cases/{id}` | Body: [`CasePatch`] |
//! | `DELETE` | `/cases/{id}` | Admin only |
//! | `POST`   | `/cases/{id}/transition` | Body: [`Transition`] |
//! | `GET`    | `/cases/{id}/evidence` | Evidence attached to the case |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use dicri_core::{
  case::{Case, CaseId, CasePatch, CaseView, NewCase, Transition},
  evidence::Evidence,
  store::CaseStore,
};
use serde::Deserialize;

use crate::{AppState, auth::CurrentActor, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub view: CaseView,
}

/// `GET /cases[?view=all|open]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Case>>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.list_cases(&actor, params.view).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /cases`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<NewCase>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  let case = state.service.create_case(&actor, body).await?;
  Ok((StatusCode::CREATED, Json(case)))
}

// ─── Single case ──────────────────────────────────────────────────────────────

/// `GET /cases/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<CaseId>,
) -> Result<Json<Case>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.get_case(&actor, id).await?))
}

/// `PUT /cases/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<CaseId>,
  Json(body): Json<CasePatch>,
) -> Result<Json<Case>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.update_case(&actor, id, body).await?))
}

/// `DELETE /cases/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<CaseId>,
) -> Result<StatusCode, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  state.service.delete_case(&actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Review ───────────────────────────────────────────────────────────────────

/// `POST /cases/{id}/transition`: body `{"state_id":3,"rejection_justification":"..."}`
pub async fn transition<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<CaseId>,
  Json(body): Json<Transition>,
) -> Result<Json<Case>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.transition_case(&actor, id, body).await?))
}

// ─── Evidence ─────────────────────────────────────────────────────────────────

/// `GET /cases/{id}/evidence`
pub async fn evidence<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<CaseId>,
) -> Result<Json<Vec<Evidence>>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.list_evidence(&actor, id).await?))
}
