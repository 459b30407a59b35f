//! Authorization policy.
//!
//! Every entry point asks the same [`Policy`] before touching a record. All
//! checks are pure and never fail: a denied action is `false`, and turning
//! that into [`crate::Error::Forbidden`] is the caller's job.

use serde::Deserialize;

use crate::{
  case::Case,
  evidence::Evidence,
  lifecycle::CaseState,
  lookup::{LookupRegistry, Role},
  user::Actor,
};

/// Tunable parts of the workflow rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowConfig {
  /// States in which the owning technician may still edit a case.
  #[serde(default = "default_editable_states")]
  pub technician_editable_states: Vec<CaseState>,
}

fn default_editable_states() -> Vec<CaseState> { vec![CaseState::Open] }

impl Default for WorkflowConfig {
  fn default() -> Self {
    Self { technician_editable_states: default_editable_states() }
  }
}

/// Role-gated decisions over cases and evidence.
#[derive(Debug, Clone, Copy)]
pub struct Policy<'a> {
  registry:            &'a LookupRegistry,
  technician_editable: &'a [CaseState],
}

impl<'a> Policy<'a> {
  pub fn new(registry: &'a LookupRegistry, config: &'a WorkflowConfig) -> Self {
    Self { registry, technician_editable: &config.technician_editable_states }
  }

  pub fn role(&self, actor: &Actor) -> Option<Role> { self.registry.role_of(actor) }

  /// The resolved lifecycle state of `case`, if its state id is known.
  pub fn state_of(&self, case: &Case) -> Option<CaseState> {
    self.registry.state(case.state_id)
  }

  fn owns(actor: &Actor, case: &Case) -> bool { case.technician_id == actor.id }

  fn assigned(actor: &Actor, case: &Case) -> bool { case.coordinator_id == actor.id }

  // ── Cases ─────────────────────────────────────────────────────────────────

  pub fn can_view(&self, actor: &Actor, case: &Case) -> bool {
    match self.role(actor) {
      Some(Role::Admin) => true,
      Some(Role::Technician) => Self::owns(actor, case),
      Some(Role::Coordinator) => Self::assigned(actor, case),
      None => false,
    }
  }

  pub fn can_edit(&self, actor: &Actor, case: &Case) -> bool {
    match self.role(actor) {
      Some(Role::Admin) => true,
      Some(Role::Technician) => {
        Self::owns(actor, case)
          && self
            .state_of(case)
            .is_some_and(|s| self.technician_editable.contains(&s))
      }
      Some(Role::Coordinator) | None => false,
    }
  }

  pub fn can_delete(&self, actor: &Actor, _case: &Case) -> bool {
    self.role(actor) == Some(Role::Admin)
  }

  pub fn can_create_case(&self, actor: &Actor) -> bool {
    matches!(self.role(actor), Some(Role::Admin | Role::Technician))
  }

  /// Review means moving the case through the lifecycle. Admins always may;
  /// coordinators only on cases assigned to them.
  pub fn can_review(&self, actor: &Actor, case: &Case) -> bool {
    match self.role(actor) {
      Some(Role::Admin) => true,
      Some(Role::Coordinator) => Self::assigned(actor, case),
      Some(Role::Technician) | None => false,
    }
  }

  // ── Evidence ──────────────────────────────────────────────────────────────

  pub fn can_create_evidence(&self, actor: &Actor, case: &Case) -> bool {
    match self.role(actor) {
      Some(Role::Admin) => true,
      Some(Role::Technician) => {
        Self::owns(actor, case) && self.state_of(case) == Some(CaseState::Open)
      }
      Some(Role::Coordinator) | None => false,
    }
  }

  /// Evidence is visible through its case, and always to the technician who
  /// collected it.
  pub fn can_view_evidence(&self, actor: &Actor, case: &Case, evidence: &Evidence) -> bool {
    self.can_view(actor, case) || self.can_edit_evidence(actor, evidence)
  }

  pub fn can_edit_evidence(&self, actor: &Actor, evidence: &Evidence) -> bool {
    match self.role(actor) {
      Some(Role::Admin) => true,
      Some(Role::Technician) => evidence.technician_id == actor.id,
      Some(Role::Coordinator) | None => false,
    }
  }

  pub fn can_delete_evidence(&self, actor: &Actor, evidence: &Evidence) -> bool {
    self.can_edit_evidence(actor, evidence)
  }

  // ── Directory ─────────────────────────────────────────────────────────────

  pub fn can_manage_users(&self, actor: &Actor) -> bool {
    self.role(actor) == Some(Role::Admin)
  }

  /// Any recognised role may read the user list (technicians pick their
  /// coordinator from it).
  pub fn can_read_directory(&self, actor: &Actor) -> bool {
    self.role(actor).is_some()
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::lookup::LookupRow;

  const ADMIN: i64 = 1;
  const TECH: i64 = 2;
  const COORD: i64 = 3;

  const OPEN: i64 = 1;
  const IN_PROCESS: i64 = 2;
  const REJECTED: i64 = 3;
  const APPROVED: i64 = 4;

  fn registry() -> LookupRegistry {
    let row = |id, name: &str| LookupRow { id, name: name.to_owned() };
    LookupRegistry::new(
      vec![row(ADMIN, "admin"), row(TECH, "tecnico"), row(COORD, "coordinador")],
      vec![
        row(OPEN, "abierto"),
        row(IN_PROCESS, "en proceso"),
        row(REJECTED, "rechazado"),
        row(APPROVED, "aprobado"),
      ],
    )
  }

  fn actor(id: i64, role_id: Option<i64>) -> Actor { Actor { id, role_id } }

  fn case(technician_id: i64, coordinator_id: i64, state_id: i64) -> Case {
    Case {
      id: 10,
      description: "evidence bag missing".into(),
      created_at: Utc::now(),
      rejection_justification: None,
      technician_id,
      coordinator_id,
      state_id,
    }
  }

  fn evidence(technician_id: i64) -> Evidence {
    Evidence {
      id: 1,
      description: "glove".into(),
      color: None,
      size: None,
      weight: None,
      location: None,
      technique: None,
      technician_id,
      case_id: 10,
    }
  }

  #[test]
  fn admin_may_do_everything() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let a = actor(1, Some(ADMIN));
    for state in [OPEN, IN_PROCESS, REJECTED, APPROVED] {
      let c = case(20, 30, state);
      assert!(p.can_view(&a, &c));
      assert!(p.can_edit(&a, &c));
      assert!(p.can_delete(&a, &c));
      assert!(p.can_review(&a, &c));
      assert!(p.can_create_evidence(&a, &c));
    }
    assert!(p.can_create_case(&a));
    assert!(p.can_manage_users(&a));
  }

  #[test]
  fn technician_never_sees_foreign_cases() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let t = actor(20, Some(TECH));
    for owner in [1, 19, 21, 30] {
      for state in [OPEN, IN_PROCESS, REJECTED, APPROVED] {
        let c = case(owner, 30, state);
        assert!(!p.can_view(&t, &c));
        assert!(!p.can_edit(&t, &c));
        assert!(!p.can_create_evidence(&t, &c));
      }
    }
  }

  #[test]
  fn technician_edits_own_case_only_while_open() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let t = actor(20, Some(TECH));
    assert!(p.can_edit(&t, &case(20, 30, OPEN)));
    assert!(!p.can_edit(&t, &case(20, 30, IN_PROCESS)));
    assert!(!p.can_edit(&t, &case(20, 30, APPROVED)));
    assert!(!p.can_delete(&t, &case(20, 30, OPEN)));
    assert!(p.can_create_case(&t));
    assert!(!p.can_review(&t, &case(20, 30, OPEN)));
  }

  #[test]
  fn editable_states_are_configurable() {
    let reg = registry();
    let cfg = WorkflowConfig {
      technician_editable_states: vec![CaseState::Open, CaseState::InProcess],
    };
    let p = Policy::new(&reg, &cfg);
    let t = actor(20, Some(TECH));
    assert!(p.can_edit(&t, &case(20, 30, IN_PROCESS)));
    // Attaching evidence stays tied to the open state.
    assert!(!p.can_create_evidence(&t, &case(20, 30, IN_PROCESS)));
  }

  #[test]
  fn technician_attaches_only_to_own_open_case() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let t = actor(20, Some(TECH));
    assert!(p.can_create_evidence(&t, &case(20, 30, OPEN)));
    assert!(!p.can_create_evidence(&t, &case(20, 30, REJECTED)));
  }

  #[test]
  fn coordinator_sees_and_reviews_assigned_cases_only() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let c = actor(30, Some(COORD));
    let mine = case(20, 30, OPEN);
    let other = case(20, 31, OPEN);
    assert!(p.can_view(&c, &mine));
    assert!(p.can_review(&c, &mine));
    assert!(!p.can_view(&c, &other));
    assert!(!p.can_review(&c, &other));
    assert!(!p.can_edit(&c, &mine));
    assert!(!p.can_delete(&c, &mine));
    assert!(!p.can_create_case(&c));
    assert!(!p.can_create_evidence(&c, &mine));
    assert!(!p.can_edit_evidence(&c, &evidence(20)));
  }

  #[test]
  fn unknown_or_null_roles_get_nothing() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    for a in [actor(20, None), actor(20, Some(99))] {
      let c = case(20, 20, OPEN);
      assert!(!p.can_view(&a, &c));
      assert!(!p.can_edit(&a, &c));
      assert!(!p.can_delete(&a, &c));
      assert!(!p.can_review(&a, &c));
      assert!(!p.can_create_case(&a));
      assert!(!p.can_create_evidence(&a, &c));
      assert!(!p.can_read_directory(&a));
      assert!(!p.can_edit_evidence(&a, &evidence(20)));
    }
  }

  #[test]
  fn evidence_edits_belong_to_its_technician() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    assert!(p.can_edit_evidence(&actor(20, Some(TECH)), &evidence(20)));
    assert!(p.can_delete_evidence(&actor(20, Some(TECH)), &evidence(20)));
    assert!(!p.can_edit_evidence(&actor(21, Some(TECH)), &evidence(20)));
    assert!(p.can_delete_evidence(&actor(1, Some(ADMIN)), &evidence(20)));
  }

  #[test]
  fn evidence_is_visible_through_case_or_collector() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let foreign = case(21, 30, OPEN);
    assert!(p.can_view_evidence(&actor(20, Some(TECH)), &foreign, &evidence(20)));
    assert!(!p.can_view_evidence(&actor(22, Some(TECH)), &foreign, &evidence(20)));
    assert!(p.can_view_evidence(&actor(30, Some(COORD)), &foreign, &evidence(20)));
    assert!(!p.can_view_evidence(&actor(31, Some(COORD)), &foreign, &evidence(20)));
    assert!(!p.can_view_evidence(&actor(20, None), &foreign, &evidence(20)));
  }

  #[test]
  fn config_defaults_to_open_only() {
    let cfg: WorkflowConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg.technician_editable_states, vec![CaseState::Open]);
    let cfg: WorkflowConfig =
      serde_json::from_str(r#"{"technician_editable_states":["open","in_process"]}"#)
        .unwrap();
    assert_eq!(cfg.technician_editable_states.len(), 2);
  }
}
