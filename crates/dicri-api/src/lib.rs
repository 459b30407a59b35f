//! JSON REST API for the DICRI case workflow.
//!
//! Exposes an axum [`Router`] backed by a [`CaseService`] over any
//! [`CaseStore`]. Every route requires HTTP Basic auth (email and password);
//! the resolved [`dicri_core::user::Actor`] is handed to the service, which
//! makes every authorization decision.

pub mod auth;
pub mod cases;
pub mod error;
pub mod evidence;
pub mod lookups;
pub mod users;

use axum::{
  Router,
  routing::{get, post},
};
use dicri_core::{CaseService, store::CaseStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub service: CaseService<S>,
}

impl<S: CaseStore> AppState<S> {
  pub fn new(service: CaseService<S>) -> Self { Self { service } }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CaseStore + Clone + 'static,
{
  Router::new()
    // Catalogs
    .route("/roles",                  get(lookups::roles::<S>))
    .route("/states",                 get(lookups::states::<S>))
    .route("/states/{id}",            get(lookups::state_one::<S>))
    // Users
    .route("/me",                     get(users::me::<S>))
    .route("/users",                  get(users::list::<S>).post(users::create::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>).put(users::update::<S>).delete(users::delete::<S>),
    )
    // Cases
    .route("/cases",                  get(cases::list::<S>).post(cases::create::<S>))
    .route(
      "/cases/{id}",
      get(cases::get_one::<S>).put(cases::update::<S>).delete(cases::delete::<S>),
    )
    .route("/cases/{id}/transition",  post(cases::transition::<S>))
    .route("/cases/{id}/evidence",    get(cases::evidence::<S>))
    // Evidence
    .route("/evidence",               get(evidence::list::<S>).post(evidence::create::<S>))
    .route(
      "/evidence/{id}",
      get(evidence::get_one::<S>)
        .put(evidence::update::<S>)
        .delete(evidence::delete::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
