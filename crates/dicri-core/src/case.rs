//! Case files ("expedientes").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{lookup::StateId, user::UserId};

pub type CaseId = i64;

/// A forensic case file as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
  pub id:                      CaseId,
  pub description:             String,
  /// Server-assigned; never changes after creation.
  pub created_at:              DateTime<Utc>,
  /// Present exactly when the state resolves to rejected.
  pub rejection_justification: Option<String>,
  pub technician_id:           UserId,
  pub coordinator_id:          UserId,
  pub state_id:                StateId,
}

/// Client input for creating a case.
///
/// For technicians `technician_id` and `state_id` are ignored: the case is
/// always theirs and always opens in the open state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCase {
  pub description:             String,
  pub coordinator_id:          UserId,
  pub technician_id:           Option<UserId>,
  pub state_id:                Option<StateId>,
  pub rejection_justification: Option<String>,
}

/// A validated case ready to be inserted. `created_at` and `id` are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct CaseRecord {
  pub description:             String,
  pub rejection_justification: Option<String>,
  pub technician_id:           UserId,
  pub coordinator_id:          UserId,
  pub state_id:                StateId,
}

/// Partial update of a case; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CasePatch {
  pub description:             Option<String>,
  pub coordinator_id:          Option<UserId>,
  pub technician_id:           Option<UserId>,
  pub state_id:                Option<StateId>,
  pub rejection_justification: Option<String>,
}

/// A review decision: move the case to `state_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct Transition {
  pub state_id:                StateId,
  pub rejection_justification: Option<String>,
}

/// Which subset of visible cases to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseView {
  #[default]
  All,
  /// Only cases in the open state ("my open cases").
  Open,
}
