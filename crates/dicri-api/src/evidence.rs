//! Handlers for `/evidence` endpoints.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use dicri_core::{
  evidence::{Evidence, EvidenceId, EvidencePatch, NewEvidence},
  store::CaseStore,
};

use crate::{AppState, auth::CurrentActor, error::ApiError};

/// `POST /evidence`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<NewEvidence>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  let evidence = state.service.create_evidence(&actor, body).await?;
  Ok((StatusCode::CREATED, Json(evidence)))
}

/// `GET /evidence`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<Evidence>>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.list_all_evidence(&actor).await?))
}

/// `GET /evidence/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<EvidenceId>,
) -> Result<Json<Evidence>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.get_evidence(&actor, id).await?))
}

/// `PUT /evidence/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<EvidenceId>,
  Json(body): Json<EvidencePatch>,
) -> Result<Json<Evidence>, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  Ok(Json(state.service.update_evidence(&actor, id, body).await?))
}

/// `DELETE /evidence/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<EvidenceId>,
) -> Result<StatusCode, ApiError>
where
  S: CaseStore + Clone + 'static,
{
  state.service.delete_evidence(&actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
