//! Lookup catalogs and the registry that resolves them.
//!
//! Roles and case states are stored as `{id, name}` rows. Business rules never
//! compare names: the registry resolves every row once, at load time, into
//! [`Role`] or [`CaseState`], and everything downstream works with the enums.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, lifecycle::CaseState, user::Actor};

pub type RoleId = i64;
pub type StateId = i64;

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Which catalog to fetch from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
  Role,
  State,
}

/// A catalog row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRow {
  pub id:   i64,
  pub name: String,
}

// ─── Role ────────────────────────────────────────────────────────────────────

/// The closed set of roles an actor can hold.
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
pub enum Role {
  Admin,
  Technician,
  Coordinator,
}

impl Role {
  /// Resolve a catalog name. Matching ignores case, accents and separators.
  pub fn from_name(name: &str) -> Option<Self> {
    match normalize_name(name).as_str() {
      "admin" | "administrador" | "administrator" => Some(Self::Admin),
      "tecnico" | "technician" => Some(Self::Technician),
      "coordinador" | "coordinator" => Some(Self::Coordinator),
      _ => None,
    }
  }
}

/// Lowercase, strip Spanish diacritics, and collapse `_`, `-` and runs of
/// whitespace into single spaces.
pub fn normalize_name(name: &str) -> String {
  let folded: String = name
    .chars()
    .flat_map(char::to_lowercase)
    .map(|c| match c {
      'á' | 'à' | 'ä' => 'a',
      'é' | 'è' | 'ë' => 'e',
      'í' | 'ì' | 'ï' => 'i',
      'ó' | 'ò' | 'ö' => 'o',
      'ú' | 'ù' | 'ü' => 'u',
      'ñ' => 'n',
      '_' | '-' => ' ',
      other => other,
    })
    .collect();
  folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Both catalogs, resolved. Built once when the service starts and shared
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct LookupRegistry {
  roles:       Vec<LookupRow>,
  states:      Vec<LookupRow>,
  role_by_id:  HashMap<RoleId, Role>,
  state_by_id: HashMap<StateId, CaseState>,
  state_ids:   HashMap<CaseState, StateId>,
}

impl LookupRegistry {
  /// Resolve raw catalog rows. Rows whose names match no known role or state
  /// are kept for display but resolve to nothing.
  ///
  /// When two state rows resolve to the same [`CaseState`], the lowest id is
  /// the one used for writes.
  pub fn new(mut roles: Vec<LookupRow>, mut states: Vec<LookupRow>) -> Self {
    roles.sort_by_key(|r| r.id);
    states.sort_by_key(|r| r.id);

    let mut role_by_id = HashMap::new();
    for row in &roles {
      match Role::from_name(&row.name) {
        Some(role) => {
          role_by_id.insert(row.id, role);
        }
        None => tracing::warn!(id = row.id, name = %row.name, "unrecognised role name"),
      }
    }

    let mut state_by_id = HashMap::new();
    let mut state_ids = HashMap::new();
    for row in &states {
      match CaseState::from_name(&row.name) {
        Some(state) => {
          state_by_id.insert(row.id, state);
          state_ids.entry(state).or_insert(row.id);
        }
        None => tracing::warn!(id = row.id, name = %row.name, "unrecognised state name"),
      }
    }

    Self { roles, states, role_by_id, state_by_id, state_ids }
  }

  pub fn roles(&self) -> &[LookupRow] { &self.roles }

  pub fn states(&self) -> &[LookupRow] { &self.states }

  pub fn state_row(&self, id: StateId) -> Option<&LookupRow> {
    self.states.iter().find(|r| r.id == id)
  }

  pub fn has_role_id(&self, id: RoleId) -> bool {
    self.roles.iter().any(|r| r.id == id)
  }

  pub fn role(&self, id: RoleId) -> Option<Role> {
    self.role_by_id.get(&id).copied()
  }

  /// The role an actor holds; `None` for a null or unrecognised role id.
  pub fn role_of(&self, actor: &Actor) -> Option<Role> {
    actor.role_id.and_then(|id| self.role(id))
  }

  pub fn state(&self, id: StateId) -> Option<CaseState> {
    self.state_by_id.get(&id).copied()
  }

  /// The row id to store for `state`.
  pub fn state_id(&self, state: CaseState) -> Result<StateId> {
    self
      .state_ids
      .get(&state)
      .copied()
      .ok_or_else(|| Error::NotFound(format!("no state row resolves to {state}")))
  }

  /// Resolve a state id coming from a client, failing if it is not in the
  /// catalog or does not resolve to a known state.
  pub fn require_state(&self, id: StateId) -> Result<CaseState> {
    self
      .state(id)
      .ok_or_else(|| Error::NotFound(format!("state {id}")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(id: i64, name: &str) -> LookupRow {
    LookupRow { id, name: name.to_owned() }
  }

  fn seeded() -> LookupRegistry {
    LookupRegistry::new(
      vec![row(1, "Administrador"), row(2, "Técnico"), row(3, "COORDINADOR")],
      vec![
        row(1, "Abierto"),
        row(2, "En Proceso"),
        row(3, "rechazado"),
        row(4, "Aprobado"),
      ],
    )
  }

  #[test]
  fn normalize_folds_case_accents_and_separators() {
    assert_eq!(normalize_name("  En_Proceso "), "en proceso");
    assert_eq!(normalize_name("Técnico"), "tecnico");
    assert_eq!(normalize_name("en   proceso"), "en proceso");
  }

  #[test]
  fn roles_resolve_by_name() {
    let r = seeded();
    assert_eq!(r.role(1), Some(Role::Admin));
    assert_eq!(r.role(2), Some(Role::Technician));
    assert_eq!(r.role(3), Some(Role::Coordinator));
    assert_eq!(r.role(99), None);
  }

  #[test]
  fn states_resolve_both_ways() {
    let r = seeded();
    assert_eq!(r.state(2), Some(CaseState::InProcess));
    assert_eq!(r.state_id(CaseState::Rejected).unwrap(), 3);
    assert_eq!(r.state_id(CaseState::Approved).unwrap(), 4);
  }

  #[test]
  fn unknown_names_stay_listed_but_unresolved() {
    let r = LookupRegistry::new(
      vec![row(7, "auditor")],
      vec![row(1, "abierto"), row(9, "archivado")],
    );
    assert_eq!(r.roles().len(), 1);
    assert_eq!(r.role(7), None);
    assert!(r.has_role_id(7));
    assert_eq!(r.state(9), None);
    assert!(r.state_row(9).is_some());
    assert!(matches!(r.require_state(9), Err(Error::NotFound(_))));
  }

  #[test]
  fn missing_state_row_is_not_found() {
    let r = LookupRegistry::new(vec![], vec![row(1, "abierto")]);
    assert!(matches!(r.state_id(CaseState::Approved), Err(Error::NotFound(_))));
  }

  #[test]
  fn duplicate_state_names_use_lowest_id() {
    let r = LookupRegistry::new(
      vec![],
      vec![row(8, "cerrado"), row(4, "aprobado")],
    );
    assert_eq!(r.state_id(CaseState::Approved).unwrap(), 4);
    assert_eq!(r.state(8), Some(CaseState::Approved));
  }

  #[test]
  fn null_role_actor_resolves_to_none() {
    let r = seeded();
    let actor = Actor { id: 5, role_id: None };
    assert_eq!(r.role_of(&actor), None);
  }
}
