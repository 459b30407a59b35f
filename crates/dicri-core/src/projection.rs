//! Role-specific views over already-fetched records.

use std::collections::HashMap;

use crate::{
  Error, Result,
  case::{Case, CaseView},
  evidence::Evidence,
  lifecycle::CaseState,
  policy::Policy,
  user::Actor,
};

/// The cases `actor` may see, optionally narrowed to open ones.
///
/// Input order is preserved. Actors without a recognised role see nothing.
pub fn list_cases_for(
  policy: &Policy<'_>,
  actor: &Actor,
  cases: Vec<Case>,
  view: CaseView,
) -> Vec<Case> {
  cases
    .into_iter()
    .filter(|c| policy.can_view(actor, c))
    .filter(|c| match view {
      CaseView::All => true,
      CaseView::Open => policy.state_of(c) == Some(CaseState::Open),
    })
    .collect()
}

/// The evidence attached to `case`, provided `actor` may view the case.
///
/// Fails with [`Error::Forbidden`] rather than returning an empty list, so
/// callers can tell "forbidden" from "no evidence yet".
pub fn list_evidence_for(
  policy: &Policy<'_>,
  actor: &Actor,
  case: &Case,
  evidence: Vec<Evidence>,
) -> Result<Vec<Evidence>> {
  if !policy.can_view(actor, case) {
    return Err(Error::Forbidden);
  }
  Ok(evidence.into_iter().filter(|e| e.case_id == case.id).collect())
}

/// Every piece of evidence `actor` may see across all cases.
///
/// Input order is preserved. Evidence whose case is not in `cases` is shown
/// only to whoever may edit it.
pub fn list_all_evidence_for(
  policy: &Policy<'_>,
  actor: &Actor,
  cases: &[Case],
  evidence: Vec<Evidence>,
) -> Vec<Evidence> {
  if policy.role(actor).is_none() {
    return Vec::new();
  }
  let by_id: HashMap<_, _> = cases.iter().map(|c| (c.id, c)).collect();
  evidence
    .into_iter()
    .filter(|e| match by_id.get(&e.case_id) {
      Some(case) => policy.can_view_evidence(actor, case, e),
      None => policy.can_edit_evidence(actor, e),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, Utc};

  use super::*;
  use crate::{
    lookup::{LookupRegistry, LookupRow},
    policy::WorkflowConfig,
  };

  fn registry() -> LookupRegistry {
    let row = |id, name: &str| LookupRow { id, name: name.to_owned() };
    LookupRegistry::new(
      vec![row(1, "administrador"), row(2, "tecnico"), row(3, "coordinador")],
      vec![row(1, "abierto"), row(2, "en proceso"), row(3, "rechazado")],
    )
  }

  fn case(id: i64, technician_id: i64, coordinator_id: i64, state_id: i64) -> Case {
    Case {
      id,
      description: format!("case {id}"),
      created_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
      rejection_justification: None,
      technician_id,
      coordinator_id,
      state_id,
    }
  }

  fn all_cases() -> Vec<Case> {
    vec![
      case(1, 20, 30, 1),
      case(2, 20, 31, 2),
      case(3, 21, 30, 1),
      case(4, 21, 31, 3),
    ]
  }

  fn ids(cases: &[Case]) -> Vec<i64> { cases.iter().map(|c| c.id).collect() }

  #[test]
  fn admin_sees_all_and_is_stable() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let admin = Actor { id: 1, role_id: Some(1) };
    let cases = all_cases();
    let first = list_cases_for(&p, &admin, cases.clone(), CaseView::All);
    let second = list_cases_for(&p, &admin, cases, CaseView::All);
    assert_eq!(ids(&first), vec![1, 2, 3, 4]);
    assert_eq!(first, second);
  }

  #[test]
  fn technician_sees_own_and_open_view_narrows() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let tech = Actor { id: 20, role_id: Some(2) };
    assert_eq!(ids(&list_cases_for(&p, &tech, all_cases(), CaseView::All)), vec![1, 2]);
    assert_eq!(ids(&list_cases_for(&p, &tech, all_cases(), CaseView::Open)), vec![1]);
  }

  #[test]
  fn coordinator_sees_assigned() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let coord = Actor { id: 31, role_id: Some(3) };
    assert_eq!(ids(&list_cases_for(&p, &coord, all_cases(), CaseView::All)), vec![2, 4]);
  }

  #[test]
  fn unknown_role_sees_nothing() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let nobody = Actor { id: 20, role_id: None };
    assert!(list_cases_for(&p, &nobody, all_cases(), CaseView::All).is_empty());
  }

  #[test]
  fn evidence_listing_distinguishes_forbidden_from_empty() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let c = case(1, 20, 30, 1);
    let owner = Actor { id: 20, role_id: Some(2) };
    let stranger = Actor { id: 21, role_id: Some(2) };
    assert!(list_evidence_for(&p, &owner, &c, vec![]).unwrap().is_empty());
    assert!(matches!(
      list_evidence_for(&p, &stranger, &c, vec![]),
      Err(Error::Forbidden)
    ));
  }

  fn evidence(id: i64, case_id: i64, technician_id: i64) -> Evidence {
    Evidence {
      id,
      description: format!("item {id}"),
      color: None,
      size: None,
      weight: None,
      location: None,
      technique: None,
      technician_id,
      case_id,
    }
  }

  fn all_evidence() -> Vec<Evidence> {
    vec![evidence(1, 1, 20), evidence(2, 2, 20), evidence(3, 3, 21), evidence(4, 4, 21)]
  }

  fn evidence_ids(evidence: &[Evidence]) -> Vec<i64> {
    evidence.iter().map(|e| e.id).collect()
  }

  #[test]
  fn evidence_across_cases_follows_role() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let cases = all_cases();

    let admin = Actor { id: 1, role_id: Some(1) };
    let all = list_all_evidence_for(&p, &admin, &cases, all_evidence());
    assert_eq!(evidence_ids(&all), vec![1, 2, 3, 4]);

    let tech = Actor { id: 21, role_id: Some(2) };
    let own = list_all_evidence_for(&p, &tech, &cases, all_evidence());
    assert_eq!(evidence_ids(&own), vec![3, 4]);

    let coord = Actor { id: 30, role_id: Some(3) };
    let assigned = list_all_evidence_for(&p, &coord, &cases, all_evidence());
    assert_eq!(evidence_ids(&assigned), vec![1, 3]);

    let nobody = Actor { id: 20, role_id: None };
    assert!(list_all_evidence_for(&p, &nobody, &cases, all_evidence()).is_empty());
  }

  #[test]
  fn orphaned_evidence_is_shown_to_its_collector_only() {
    let reg = registry();
    let cfg = WorkflowConfig::default();
    let p = Policy::new(&reg, &cfg);
    let orphan = vec![evidence(9, 99, 20)];
    let tech = Actor { id: 20, role_id: Some(2) };
    let coord = Actor { id: 30, role_id: Some(3) };
    assert_eq!(evidence_ids(&list_all_evidence_for(&p, &tech, &[], orphan.clone())), vec![9]);
    assert!(list_all_evidence_for(&p, &coord, &[], orphan).is_empty());
  }
}
