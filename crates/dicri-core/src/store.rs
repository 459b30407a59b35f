//! The `CaseStore` trait: everything the workflow needs from persistence.
//!
//! The trait is implemented by storage backends (e.g. `dicri-store-sqlite`).
//! The service and the API depend on this abstraction, not on any concrete
//! backend. Missing rows are reported as `None`/`false`, never as errors;
//! unavailable (soft-deleted) rows count as missing.
//!
//! All methods return `Send` futures so the trait can be used in multi-threaded
//! async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  case::{Case, CaseId, CaseRecord},
  evidence::{Evidence, EvidenceId, EvidenceRecord},
  lookup::{LookupKind, LookupRow},
  user::{Credentials, NewUser, User, UserId, UserPatch},
};

pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Lookups ───────────────────────────────────────────────────────────

  /// Every available row of one catalog, ordered by id.
  fn fetch_lookup(
    &self,
    kind: LookupKind,
  ) -> impl Future<Output = Result<Vec<LookupRow>, Self::Error>> + Send + '_;

  // ── Cases ─────────────────────────────────────────────────────────────

  fn fetch_case(
    &self,
    id: CaseId,
  ) -> impl Future<Output = Result<Option<Case>, Self::Error>> + Send + '_;

  /// All available cases, ordered by id.
  fn list_cases(
    &self,
  ) -> impl Future<Output = Result<Vec<Case>, Self::Error>> + Send + '_;

  /// Insert a case. The store assigns `id` and `created_at`.
  fn create_case(
    &self,
    record: CaseRecord,
  ) -> impl Future<Output = Result<Case, Self::Error>> + Send + '_;

  /// Overwrite every mutable column of an existing case. Returns `false` if
  /// the case does not exist.
  fn save_case<'a>(
    &'a self,
    case: &'a Case,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Make a case and its evidence unavailable. Returns `false` if it did not
  /// exist.
  fn delete_case(
    &self,
    id: CaseId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Evidence ──────────────────────────────────────────────────────────

  fn fetch_evidence(
    &self,
    id: EvidenceId,
  ) -> impl Future<Output = Result<Option<Evidence>, Self::Error>> + Send + '_;

  /// All available evidence, ordered by id.
  fn list_evidence(
    &self,
  ) -> impl Future<Output = Result<Vec<Evidence>, Self::Error>> + Send + '_;

  /// All available evidence attached to `case_id`, ordered by id.
  fn fetch_evidence_by_case(
    &self,
    case_id: CaseId,
  ) -> impl Future<Output = Result<Vec<Evidence>, Self::Error>> + Send + '_;

  fn create_evidence(
    &self,
    record: EvidenceRecord,
  ) -> impl Future<Output = Result<Evidence, Self::Error>> + Send + '_;

  fn save_evidence<'a>(
    &'a self,
    evidence: &'a Evidence,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn delete_evidence(
    &self,
    id: EvidenceId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  fn fetch_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn list_users(
    &self,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Look up a user and their password hash by email, for authentication.
  fn fetch_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;

  /// Insert a user. Returns `None` if the email is already taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Apply `patch` to a user and return the result; `None` if the user does
  /// not exist.
  fn update_user(
    &self,
    id: UserId,
    patch: UserPatch,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn delete_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
