//! [`CaseService`]: the single entry point for every workflow operation.
//!
//! Each operation follows the same shape: fetch what it needs from the
//! store, ask the [`Policy`], validate and apply the effect through the
//! lifecycle rules, persist, and return what the actor is allowed to see.

use std::sync::Arc;

use crate::{
  Error, Result,
  case::{Case, CaseId, CasePatch, CaseRecord, CaseView, NewCase, Transition},
  evidence::{Evidence, EvidenceId, EvidencePatch, NewEvidence},
  lifecycle::{CaseState, check_transition, normalize_justification, validate_description},
  lookup::{LookupKind, LookupRegistry, LookupRow, Role, StateId},
  policy::{Policy, WorkflowConfig},
  projection::{list_all_evidence_for, list_cases_for, list_evidence_for},
  store::CaseStore,
  user::{Actor, NewUser, User, UserId, UserPatch},
};

fn deny(actor: &Actor, action: &'static str) -> Error {
  tracing::warn!(actor = actor.id, role_id = ?actor.role_id, action, "denied");
  Error::Forbidden
}

/// Workflow operations over any [`CaseStore`].
///
/// Cloning is cheap; the store is shared and the registry is resolved once
/// in [`CaseService::load`].
pub struct CaseService<S> {
  store:    Arc<S>,
  registry: Arc<LookupRegistry>,
  config:   Arc<WorkflowConfig>,
}

impl<S> Clone for CaseService<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      registry: Arc::clone(&self.registry),
      config:   Arc::clone(&self.config),
    }
  }
}

impl<S: CaseStore> CaseService<S> {
  /// Fetch both lookup catalogs and build the service around them.
  pub async fn load(store: Arc<S>, config: WorkflowConfig) -> Result<Self> {
    let roles = store
      .fetch_lookup(LookupKind::Role)
      .await
      .map_err(Error::store)?;
    let states = store
      .fetch_lookup(LookupKind::State)
      .await
      .map_err(Error::store)?;
    let registry = LookupRegistry::new(roles, states);

    tracing::info!(
      roles = registry.roles().len(),
      states = registry.states().len(),
      editable = ?config.technician_editable_states,
      "lookup catalogs loaded"
    );

    Ok(Self {
      store,
      registry: Arc::new(registry),
      config: Arc::new(config),
    })
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn registry(&self) -> &LookupRegistry { &self.registry }

  pub fn policy(&self) -> Policy<'_> { Policy::new(&self.registry, &self.config) }

  // ── Lookups ───────────────────────────────────────────────────────────────

  pub fn roles(&self, actor: &Actor) -> Result<&[LookupRow]> {
    if !self.policy().can_read_directory(actor) {
      return Err(deny(actor, "list_roles"));
    }
    Ok(self.registry.roles())
  }

  pub fn states(&self, actor: &Actor) -> Result<&[LookupRow]> {
    if !self.policy().can_read_directory(actor) {
      return Err(deny(actor, "list_states"));
    }
    Ok(self.registry.states())
  }

  pub fn state(&self, actor: &Actor, id: StateId) -> Result<&LookupRow> {
    if !self.policy().can_read_directory(actor) {
      return Err(deny(actor, "get_state"));
    }
    self
      .registry
      .state_row(id)
      .ok_or_else(|| Error::NotFound(format!("state {id}")))
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn load_case(&self, id: CaseId) -> Result<Case> {
    self
      .store
      .fetch_case(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("case {id}")))
  }

  async fn load_evidence(&self, id: EvidenceId) -> Result<Evidence> {
    self
      .store
      .fetch_evidence(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("evidence {id}")))
  }

  /// Non-admins get [`Error::Forbidden`] for records that do not exist, the
  /// same answer as for records they may not see.
  fn mask_missing(&self, actor: &Actor, err: Error) -> Error {
    match err {
      Error::NotFound(_) if self.policy().role(actor) != Some(Role::Admin) => {
        deny(actor, "missing_record")
      }
      err => err,
    }
  }

  async fn case_for(&self, actor: &Actor, id: CaseId) -> Result<Case> {
    self.load_case(id).await.map_err(|e| self.mask_missing(actor, e))
  }

  async fn evidence_for(&self, actor: &Actor, id: EvidenceId) -> Result<Evidence> {
    self.load_evidence(id).await.map_err(|e| self.mask_missing(actor, e))
  }

  /// A case may only be assigned to an available user holding `expected`.
  async fn check_assignee(&self, id: UserId, expected: Role) -> Result<()> {
    let user = self.store.fetch_user(id).await.map_err(Error::store)?;
    match user.and_then(|u| u.role_id).and_then(|r| self.registry.role(r)) {
      Some(role) if role == expected => Ok(()),
      _ => Err(Error::Validation(format!("user {id} is not an active {expected}"))),
    }
  }

  async fn persist_case(&self, case: &Case) -> Result<()> {
    if !self.store.save_case(case).await.map_err(Error::store)? {
      return Err(Error::NotFound(format!("case {}", case.id)));
    }
    Ok(())
  }

  // ── Cases ─────────────────────────────────────────────────────────────────

  /// Open a new case.
  ///
  /// Technicians always own the case they open and it always starts open.
  /// Admins name the technician and may pick any state (defaulting to open).
  pub async fn create_case(&self, actor: &Actor, input: NewCase) -> Result<Case> {
    let policy = self.policy();
    if !policy.can_create_case(actor) {
      return Err(deny(actor, "create_case"));
    }
    validate_description(&input.description)?;

    let (technician_id, state_id) = match policy.role(actor) {
      Some(Role::Technician) => (actor.id, self.registry.state_id(CaseState::Open)?),
      _ => {
        let technician_id = input
          .technician_id
          .ok_or_else(|| Error::Validation("technician_id is required".into()))?;
        let state_id = match input.state_id {
          Some(id) => {
            self.registry.require_state(id)?;
            id
          }
          None => self.registry.state_id(CaseState::Open)?,
        };
        (technician_id, state_id)
      }
    };

    let rejection_justification =
      normalize_justification(self.registry.state(state_id), input.rejection_justification)?;

    self.check_assignee(technician_id, Role::Technician).await?;
    self.check_assignee(input.coordinator_id, Role::Coordinator).await?;

    let case = self
      .store
      .create_case(CaseRecord {
        description: input.description.trim().to_owned(),
        rejection_justification,
        technician_id,
        coordinator_id: input.coordinator_id,
        state_id,
      })
      .await
      .map_err(Error::store)?;

    tracing::info!(case = case.id, actor = actor.id, state = case.state_id, "case created");
    Ok(case)
  }

  pub async fn get_case(&self, actor: &Actor, id: CaseId) -> Result<Case> {
    let case = self.case_for(actor, id).await?;
    if !self.policy().can_view(actor, &case) {
      return Err(deny(actor, "view_case"));
    }
    Ok(case)
  }

  pub async fn list_cases(&self, actor: &Actor, view: CaseView) -> Result<Vec<Case>> {
    let policy = self.policy();
    if policy.role(actor).is_none() {
      return Err(deny(actor, "list_cases"));
    }
    let cases = self.store.list_cases().await.map_err(Error::store)?;
    let visible = list_cases_for(&policy, actor, cases, view);
    tracing::debug!(actor = actor.id, ?view, count = visible.len(), "cases listed");
    Ok(visible)
  }

  /// Edit a case's fields.
  ///
  /// Technicians may change the description and coordinator of their own
  /// editable cases. Admins may additionally reassign the technician and set
  /// any state, bypassing the transition graph.
  pub async fn update_case(&self, actor: &Actor, id: CaseId, patch: CasePatch) -> Result<Case> {
    let mut case = self.case_for(actor, id).await?;
    let policy = self.policy();
    if !policy.can_edit(actor, &case) {
      return Err(deny(actor, "edit_case"));
    }

    if policy.role(actor) == Some(Role::Admin) {
      if let Some(technician_id) = patch.technician_id {
        if technician_id != case.technician_id {
          self.check_assignee(technician_id, Role::Technician).await?;
        }
        case.technician_id = technician_id;
      }
      if let Some(state_id) = patch.state_id {
        self.registry.require_state(state_id)?;
        case.state_id = state_id;
      }
      if patch.rejection_justification.is_some() {
        case.rejection_justification = patch.rejection_justification;
      }
    } else {
      let reassigns = patch.technician_id.is_some_and(|t| t != case.technician_id);
      let moves = patch.state_id.is_some_and(|s| s != case.state_id);
      let justifies = patch.rejection_justification.is_some();
      if reassigns || moves || justifies {
        return Err(deny(actor, "edit_case_restricted_fields"));
      }
    }

    if let Some(description) = patch.description {
      case.description = description.trim().to_owned();
    }
    if let Some(coordinator_id) = patch.coordinator_id {
      if coordinator_id != case.coordinator_id {
        self.check_assignee(coordinator_id, Role::Coordinator).await?;
      }
      case.coordinator_id = coordinator_id;
    }

    validate_description(&case.description)?;
    case.rejection_justification = normalize_justification(
      self.registry.state(case.state_id),
      case.rejection_justification.take(),
    )?;

    self.persist_case(&case).await?;
    tracing::info!(case = case.id, actor = actor.id, "case updated");
    Ok(case)
  }

  /// Move a case through its lifecycle as a reviewer.
  pub async fn transition_case(
    &self,
    actor: &Actor,
    id: CaseId,
    transition: Transition,
  ) -> Result<Case> {
    let mut case = self.case_for(actor, id).await?;
    let policy = self.policy();
    let role = match policy.role(actor) {
      Some(role) if policy.can_review(actor, &case) => role,
      _ => return Err(deny(actor, "review_case")),
    };

    let to = self.registry.require_state(transition.state_id)?;
    match policy.state_of(&case) {
      Some(from) => check_transition(role, from, to)?,
      None if role == Role::Admin => {}
      None => {
        return Err(Error::InvalidTransition(format!(
          "case {id} is in an unrecognised state"
        )));
      }
    }

    let from_id = case.state_id;
    case.state_id = transition.state_id;
    case.rejection_justification =
      normalize_justification(Some(to), transition.rejection_justification)?;

    self.persist_case(&case).await?;
    tracing::info!(case = case.id, actor = actor.id, from = from_id, to = %to, "case transitioned");
    Ok(case)
  }

  pub async fn delete_case(&self, actor: &Actor, id: CaseId) -> Result<()> {
    let case = self.case_for(actor, id).await?;
    if !self.policy().can_delete(actor, &case) {
      return Err(deny(actor, "delete_case"));
    }
    if !self.store.delete_case(id).await.map_err(Error::store)? {
      return Err(Error::NotFound(format!("case {id}")));
    }
    tracing::info!(case = id, actor = actor.id, "case deleted");
    Ok(())
  }

  // ── Evidence ──────────────────────────────────────────────────────────────

  /// Attach evidence to a case.
  ///
  /// The record's technician is the acting technician, whatever the input
  /// says. Only admins may name someone else (defaulting to the case's
  /// technician).
  pub async fn create_evidence(&self, actor: &Actor, input: NewEvidence) -> Result<Evidence> {
    let case = self.case_for(actor, input.case_id).await?;
    let policy = self.policy();
    let role = policy.role(actor);

    if !policy.can_create_evidence(actor, &case) {
      if role == Some(Role::Technician) && case.technician_id == actor.id {
        let state = policy
          .state_of(&case)
          .map_or_else(|| "unrecognised".to_owned(), |s| s.to_string());
        return Err(Error::InvalidTransition(format!(
          "case {} is {state}; evidence can only be attached to open cases",
          case.id
        )));
      }
      return Err(deny(actor, "create_evidence"));
    }
    validate_description(&input.description)?;

    let technician_id = match (role, input.technician_id) {
      (Some(Role::Admin), Some(technician_id)) => {
        if technician_id != case.technician_id {
          self.check_assignee(technician_id, Role::Technician).await?;
        }
        technician_id
      }
      (Some(Role::Admin), None) => case.technician_id,
      _ => actor.id,
    };

    let evidence = self
      .store
      .create_evidence(input.into_record(technician_id))
      .await
      .map_err(Error::store)?;

    tracing::info!(evidence = evidence.id, case = case.id, actor = actor.id, "evidence attached");
    Ok(evidence)
  }

  /// Evidence is visible to whoever may view its case, and to the technician
  /// who recorded it.
  pub async fn get_evidence(&self, actor: &Actor, id: EvidenceId) -> Result<Evidence> {
    let evidence = self.evidence_for(actor, id).await?;
    let case = self.case_for(actor, evidence.case_id).await?;
    if !self.policy().can_view_evidence(actor, &case, &evidence) {
      return Err(deny(actor, "view_evidence"));
    }
    Ok(evidence)
  }

  pub async fn list_evidence(&self, actor: &Actor, case_id: CaseId) -> Result<Vec<Evidence>> {
    let case = self.case_for(actor, case_id).await?;
    let policy = self.policy();
    if !policy.can_view(actor, &case) {
      return Err(deny(actor, "list_evidence"));
    }
    let evidence = self
      .store
      .fetch_evidence_by_case(case_id)
      .await
      .map_err(Error::store)?;
    list_evidence_for(&policy, actor, &case, evidence)
  }

  /// Every piece of evidence the actor may see, across all cases.
  pub async fn list_all_evidence(&self, actor: &Actor) -> Result<Vec<Evidence>> {
    let policy = self.policy();
    if policy.role(actor).is_none() {
      return Err(deny(actor, "list_all_evidence"));
    }
    let cases = self.store.list_cases().await.map_err(Error::store)?;
    let evidence = self.store.list_evidence().await.map_err(Error::store)?;
    let visible = list_all_evidence_for(&policy, actor, &cases, evidence);
    tracing::debug!(actor = actor.id, count = visible.len(), "evidence listed");
    Ok(visible)
  }

  /// Edit an evidence record. Only admins may move it to another case or
  /// technician.
  pub async fn update_evidence(
    &self,
    actor: &Actor,
    id: EvidenceId,
    patch: EvidencePatch,
  ) -> Result<Evidence> {
    let mut evidence = self.evidence_for(actor, id).await?;
    let policy = self.policy();
    if !policy.can_edit_evidence(actor, &evidence) {
      return Err(deny(actor, "edit_evidence"));
    }

    if patch.moves_relations(&evidence) {
      if policy.role(actor) != Some(Role::Admin) {
        return Err(deny(actor, "move_evidence"));
      }
      if let Some(case_id) = patch.case_id {
        self.load_case(case_id).await?;
        evidence.case_id = case_id;
      }
      if let Some(technician_id) = patch.technician_id {
        if technician_id != evidence.technician_id {
          self.check_assignee(technician_id, Role::Technician).await?;
        }
        evidence.technician_id = technician_id;
      }
    }

    patch.apply_descriptive(&mut evidence);
    validate_description(&evidence.description)?;

    if !self.store.save_evidence(&evidence).await.map_err(Error::store)? {
      return Err(Error::NotFound(format!("evidence {id}")));
    }
    tracing::info!(evidence = id, actor = actor.id, "evidence updated");
    Ok(evidence)
  }

  pub async fn delete_evidence(&self, actor: &Actor, id: EvidenceId) -> Result<()> {
    let evidence = self.evidence_for(actor, id).await?;
    if !self.policy().can_delete_evidence(actor, &evidence) {
      return Err(deny(actor, "delete_evidence"));
    }
    if !self.store.delete_evidence(id).await.map_err(Error::store)? {
      return Err(Error::NotFound(format!("evidence {id}")));
    }
    tracing::info!(evidence = id, actor = actor.id, "evidence deleted");
    Ok(())
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  pub async fn list_users(&self, actor: &Actor) -> Result<Vec<User>> {
    if !self.policy().can_read_directory(actor) {
      return Err(deny(actor, "list_users"));
    }
    self.store.list_users().await.map_err(Error::store)
  }

  pub async fn get_user(&self, actor: &Actor, id: UserId) -> Result<User> {
    if !self.policy().can_read_directory(actor) {
      return Err(deny(actor, "get_user"));
    }
    self
      .store
      .fetch_user(id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("user {id}")))
  }

  fn validate_user_fields(
    &self,
    email: Option<&str>,
    name: Option<&str>,
    role_id: Option<i64>,
  ) -> Result<()> {
    if let Some(email) = email
      && !email.contains('@')
    {
      return Err(Error::Validation(format!("{email:?} is not an email address")));
    }
    if name.is_some_and(|n| n.trim().is_empty()) {
      return Err(Error::Validation("name must not be empty".into()));
    }
    if let Some(role_id) = role_id
      && !self.registry.has_role_id(role_id)
    {
      return Err(Error::Validation(format!("role {role_id} does not exist")));
    }
    Ok(())
  }

  pub async fn create_user(&self, actor: &Actor, input: NewUser) -> Result<User> {
    if !self.policy().can_manage_users(actor) {
      return Err(deny(actor, "create_user"));
    }
    let user = self.insert_user(input).await?;
    tracing::info!(user = user.id, actor = actor.id, "user created");
    Ok(user)
  }

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    self.validate_user_fields(Some(input.email.as_str()), Some(input.name.as_str()), input.role_id)?;
    let email = input.email.clone();
    self
      .store
      .create_user(input)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::Validation(format!("{email} is already registered")))
  }

  /// Create `input` unless a user with that email already exists. Used at
  /// startup to seed the first administrator; runs without an actor.
  pub async fn bootstrap_user(&self, input: NewUser) -> Result<User> {
    if let Some(existing) = self
      .store
      .fetch_credentials(&input.email)
      .await
      .map_err(Error::store)?
    {
      return Ok(existing.user);
    }
    let user = self.insert_user(input).await?;
    tracing::info!(user = user.id, email = %user.email, "bootstrap user created");
    Ok(user)
  }

  pub async fn update_user(&self, actor: &Actor, id: UserId, patch: UserPatch) -> Result<User> {
    if !self.policy().can_manage_users(actor) {
      return Err(deny(actor, "update_user"));
    }
    self.validate_user_fields(
      patch.email.as_deref(),
      patch.name.as_deref(),
      patch.role_id.flatten(),
    )?;

    if let Some(email) = &patch.email {
      let taken = self
        .store
        .fetch_credentials(email)
        .await
        .map_err(Error::store)?
        .is_some_and(|c| c.user.id != id);
      if taken {
        return Err(Error::Validation(format!("{email} is already registered")));
      }
    }

    let user = self
      .store
      .update_user(id, patch)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::NotFound(format!("user {id}")))?;
    tracing::info!(user = id, actor = actor.id, "user updated");
    Ok(user)
  }

  pub async fn delete_user(&self, actor: &Actor, id: UserId) -> Result<()> {
    if !self.policy().can_manage_users(actor) {
      return Err(deny(actor, "delete_user"));
    }
    if !self.store.delete_user(id).await.map_err(Error::store)? {
      return Err(Error::NotFound(format!("user {id}")));
    }
    tracing::info!(user = id, actor = actor.id, "user deleted");
    Ok(())
  }
}
