//! Case lifecycle: the state set, the transition graph, and the field rules
//! each state imposes.
//!
//! ```text
//!            coordinator
//!   Open ────────────────▶ InProcess
//!    │ \                    │     │
//!    │  \── admin/coord ──▶ Rejected (justification required)
//!    │                      │
//!    └───── admin/coord ──▶ Approved
//! ```
//!
//! Admins bypass the graph entirely; see [`transition_allowed`].

use serde::{Deserialize, Serialize};

use crate::{Error, Result, lookup::{Role, normalize_name}};

/// Where a case is in its lifecycle.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CaseState {
  Open,
  InProcess,
  Rejected,
  Approved,
}

impl CaseState {
  /// Resolve a catalog name ("abierto", "en proceso", ...).
  pub fn from_name(name: &str) -> Option<Self> {
    match normalize_name(name).as_str() {
      "abierto" | "open" => Some(Self::Open),
      "en proceso" | "in process" => Some(Self::InProcess),
      "rechazado" | "rejected" => Some(Self::Rejected),
      "aprobado" | "finalizado" | "cerrado" | "approved" => Some(Self::Approved),
      _ => None,
    }
  }

  /// A reviewed case: no further coordinator transitions apply.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Rejected | Self::Approved)
  }
}

/// Whether `role` may move a case from `from` to `to` by the ordinary graph.
///
/// Admin is always allowed (override path). Technicians never transition.
pub fn transition_allowed(role: Role, from: CaseState, to: CaseState) -> bool {
  use CaseState::*;
  match role {
    Role::Admin => true,
    Role::Coordinator => {
      !from.is_terminal() && matches!((from, to), (Open, InProcess) | (_, Rejected | Approved))
    }
    Role::Technician => false,
  }
}

pub fn check_transition(role: Role, from: CaseState, to: CaseState) -> Result<()> {
  if transition_allowed(role, from, to) {
    Ok(())
  } else {
    Err(Error::InvalidTransition(format!(
      "{role} may not move a case from {from} to {to}"
    )))
  }
}

/// Reject empty (or whitespace-only) descriptions.
pub fn validate_description(description: &str) -> Result<()> {
  if description.trim().is_empty() {
    return Err(Error::Validation("description must not be empty".into()));
  }
  Ok(())
}

/// Apply the justification rule for a case that is about to be stored in
/// `state`: required and non-empty when rejected, cleared otherwise.
///
/// `state` is `None` when the stored id resolves to no known state; such a
/// case is never rejected, so any justification is cleared.
pub fn normalize_justification(
  state: Option<CaseState>,
  justification: Option<String>,
) -> Result<Option<String>> {
  match state {
    Some(CaseState::Rejected) => {
      let text = justification
        .map(|j| j.trim().to_owned())
        .filter(|j| !j.is_empty())
        .ok_or_else(|| {
          Error::Validation("a rejected case requires a rejection justification".into())
        })?;
      Ok(Some(text))
    }
    _ => Ok(None),
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;
  use super::CaseState::*;

  #[test]
  fn names_resolve() {
    assert_eq!(CaseState::from_name("Abierto"), Some(Open));
    assert_eq!(CaseState::from_name("EN PROCESO"), Some(InProcess));
    assert_eq!(CaseState::from_name("Rechazado"), Some(Rejected));
    assert_eq!(CaseState::from_name("finalizado"), Some(Approved));
    assert_eq!(CaseState::from_name("archivado"), None);
  }

  #[test]
  fn admin_may_go_anywhere() {
    for from in CaseState::iter() {
      for to in CaseState::iter() {
        assert!(transition_allowed(Role::Admin, from, to), "{from} -> {to}");
      }
    }
  }

  #[test]
  fn technician_never_transitions() {
    for from in CaseState::iter() {
      for to in CaseState::iter() {
        assert!(!transition_allowed(Role::Technician, from, to));
      }
    }
  }

  #[test]
  fn coordinator_follows_the_graph() {
    let allowed = [
      (Open, InProcess),
      (Open, Rejected),
      (Open, Approved),
      (InProcess, Rejected),
      (InProcess, Approved),
    ];
    for from in CaseState::iter() {
      for to in CaseState::iter() {
        assert_eq!(
          transition_allowed(Role::Coordinator, from, to),
          allowed.contains(&(from, to)),
          "{from} -> {to}"
        );
      }
    }
  }

  #[test]
  fn terminal_states_cannot_be_reopened_by_coordinator() {
    let err = check_transition(Role::Coordinator, Approved, Open).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition(_)));
    assert!(Approved.is_terminal() && Rejected.is_terminal());
    assert!(!InProcess.is_terminal());
  }

  #[test]
  fn rejected_requires_justification() {
    assert!(matches!(
      normalize_justification(Some(Rejected), None),
      Err(Error::Validation(_))
    ));
    assert!(matches!(
      normalize_justification(Some(Rejected), Some("   ".into())),
      Err(Error::Validation(_))
    ));
    assert_eq!(
      normalize_justification(Some(Rejected), Some(" chain broken ".into())).unwrap(),
      Some("chain broken".into())
    );
  }

  #[test]
  fn other_states_clear_justification() {
    for state in [Some(Open), Some(InProcess), Some(Approved), None] {
      assert_eq!(normalize_justification(state, Some("stale".into())).unwrap(), None);
    }
  }

  #[test]
  fn blank_description_is_rejected() {
    assert!(validate_description("  \n").is_err());
    assert!(validate_description("evidence bag missing").is_ok());
  }

  #[test]
  fn serde_uses_snake_case() {
    assert_eq!(serde_json::to_string(&InProcess).unwrap(), "\"in_process\"");
    assert_eq!(InProcess.to_string(), "in_process");
  }
}
