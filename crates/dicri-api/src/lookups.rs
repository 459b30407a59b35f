//! Handlers for the read-only catalogs.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/roles` | |
//! | `GET`  | `/states` | |
//! | `GET`  | `/states/{id}` | 404 if not in the catalog |

use axum::{
  Json,
  extract::{Path, State},
};
use dicri_core::{
  lookup::{LookupRow, StateId},
  store::CaseStore,
};

use crate::{AppState, auth::CurrentActor, error::ApiError};

/// `GET /roles`
pub async fn roles<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<LookupRow>>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.roles(&actor)?.to_vec()))
}

/// `GET /states`
pub async fn states<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<LookupRow>>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.states(&actor)?.to_vec()))
}

/// `GET /states/{id}`
pub async fn state_one<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<StateId>,
) -> Result<Json<LookupRow>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.state(&actor, id)?.clone()))
}
