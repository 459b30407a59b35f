//! Physical evidence records ("indicios"). Flat records: they carry no state
//! of their own and follow the case they are attached to.

use serde::{Deserialize, Serialize};

use crate::{case::CaseId, patch::nullable, user::UserId};

pub type EvidenceId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
  pub id:            EvidenceId,
  pub description:   String,
  pub color:         Option<String>,
  pub size:          Option<String>,
  pub weight:        Option<String>,
  pub location:      Option<String>,
  /// The collection technique used.
  pub technique:     Option<String>,
  pub technician_id: UserId,
  pub case_id:       CaseId,
}

/// Client input for attaching evidence to a case.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEvidence {
  pub case_id:       CaseId,
  pub description:   String,
  pub color:         Option<String>,
  pub size:          Option<String>,
  pub weight:        Option<String>,
  pub location:      Option<String>,
  pub technique:     Option<String>,
  /// Honoured for admins only; everyone else is recorded as themselves.
  pub technician_id: Option<UserId>,
}

/// A validated evidence record ready to be inserted; `id` is assigned by the
/// store.
#[derive(Debug, Clone)]
pub struct EvidenceRecord {
  pub description:   String,
  pub color:         Option<String>,
  pub size:          Option<String>,
  pub weight:        Option<String>,
  pub location:      Option<String>,
  pub technique:     Option<String>,
  pub technician_id: UserId,
  pub case_id:       CaseId,
}

impl NewEvidence {
  /// Finish the record with the technician that will own it.
  pub fn into_record(self, technician_id: UserId) -> EvidenceRecord {
    EvidenceRecord {
      description: self.description,
      color: self.color,
      size: self.size,
      weight: self.weight,
      location: self.location,
      technique: self.technique,
      technician_id,
      case_id: self.case_id,
    }
  }
}

/// Partial update of an evidence record. An absent key leaves a field
/// unchanged; `null` clears a nullable descriptive field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvidencePatch {
  pub description:   Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub color:         Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub size:          Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub weight:        Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub location:      Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub technique:     Option<Option<String>>,
  pub technician_id: Option<UserId>,
  pub case_id:       Option<CaseId>,
}

impl EvidencePatch {
  /// Whether the patch touches the relational fields.
  pub fn moves_relations(&self, current: &Evidence) -> bool {
    self.case_id.is_some_and(|id| id != current.case_id)
      || self.technician_id.is_some_and(|id| id != current.technician_id)
  }

  /// Apply the descriptive fields onto `evidence`.
  pub fn apply_descriptive(self, evidence: &mut Evidence) {
    if let Some(v) = self.description {
      evidence.description = v;
    }
    if let Some(v) = self.color {
      evidence.color = v;
    }
    if let Some(v) = self.size {
      evidence.size = v;
    }
    if let Some(v) = self.weight {
      evidence.weight = v;
    }
    if let Some(v) = self.location {
      evidence.location = v;
    }
    if let Some(v) = self.technique {
      evidence.technique = v;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn evidence() -> Evidence {
    Evidence {
      id:            1,
      description:   "casquillo".into(),
      color:         Some("rojo".into()),
      size:          Some("9mm".into()),
      weight:        None,
      location:      Some("sala 2".into()),
      technique:     None,
      technician_id: 20,
      case_id:       10,
    }
  }

  #[test]
  fn null_clears_and_absent_keeps() {
    let mut ev = evidence();
    let patch: EvidencePatch =
      serde_json::from_str(r#"{"color": null, "weight": "12g"}"#).unwrap();
    patch.apply_descriptive(&mut ev);
    assert_eq!(ev.color, None);
    assert_eq!(ev.weight.as_deref(), Some("12g"));
    assert_eq!(ev.size.as_deref(), Some("9mm"));
    assert_eq!(ev.location.as_deref(), Some("sala 2"));
  }

  #[test]
  fn relational_fields_detect_moves() {
    let ev = evidence();
    let same: EvidencePatch = serde_json::from_str(r#"{"case_id": 10}"#).unwrap();
    assert!(!same.moves_relations(&ev));
    let moved: EvidencePatch = serde_json::from_str(r#"{"technician_id": 21}"#).unwrap();
    assert!(moved.moves_relations(&ev));
  }
}
