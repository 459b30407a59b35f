//! Encoding and decoding helpers between domain types and SQLite rows.
//!
//! Timestamps are stored as RFC 3339 strings. Ids are SQLite integer row ids.
//! Every `SELECT` in the store uses the column lists defined here so the row
//! readers below stay in step with the queries.

use chrono::{DateTime, Utc};
use dicri_core::{
  case::Case,
  evidence::Evidence,
  lookup::{LookupKind, LookupRow},
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

pub fn lookup_table(kind: LookupKind) -> &'static str {
  match kind {
    LookupKind::Role => "roles",
    LookupKind::State => "case_states",
  }
}

pub fn read_lookup(row: &rusqlite::Row<'_>) -> rusqlite::Result<LookupRow> {
  Ok(LookupRow { id: row.get(0)?, name: row.get(1)? })
}

// ─── Cases ───────────────────────────────────────────────────────────────────

pub const CASE_COLUMNS: &str = "id, description, created_at, rejection_justification, \
                                technician_id, coordinator_id, state_id";

/// Raw values read directly from a `cases` row.
pub struct RawCase {
  pub id:                      i64,
  pub description:             String,
  pub created_at:              String,
  pub rejection_justification: Option<String>,
  pub technician_id:           i64,
  pub coordinator_id:          i64,
  pub state_id:                i64,
}

pub fn read_case(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCase> {
  Ok(RawCase {
    id:                      row.get(0)?,
    description:             row.get(1)?,
    created_at:              row.get(2)?,
    rejection_justification: row.get(3)?,
    technician_id:           row.get(4)?,
    coordinator_id:          row.get(5)?,
    state_id:                row.get(6)?,
  })
}

impl RawCase {
  pub fn into_case(self) -> Result<Case> {
    Ok(Case {
      id:                      self.id,
      description:             self.description,
      created_at:              decode_dt(&self.created_at)?,
      rejection_justification: self.rejection_justification,
      technician_id:           self.technician_id,
      coordinator_id:          self.coordinator_id,
      state_id:                self.state_id,
    })
  }
}

// ─── Evidence ────────────────────────────────────────────────────────────────

pub const EVIDENCE_COLUMNS: &str = "id, description, color, size, weight, location, \
                                    technique, technician_id, case_id";

pub fn read_evidence(row: &rusqlite::Row<'_>) -> rusqlite::Result<Evidence> {
  Ok(Evidence {
    id:            row.get(0)?,
    description:   row.get(1)?,
    color:         row.get(2)?,
    size:          row.get(3)?,
    weight:        row.get(4)?,
    location:      row.get(5)?,
    technique:     row.get(6)?,
    technician_id: row.get(7)?,
    case_id:       row.get(8)?,
  })
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "id, email, name, role_id, created_at";

/// Raw values read directly from a `users` row. `password_hash` is only
/// selected by the credentials query.
pub struct RawUser {
  pub id:            i64,
  pub email:         String,
  pub name:          String,
  pub role_id:       Option<i64>,
  pub created_at:    String,
  pub password_hash: Option<String>,
}

pub fn read_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    id:            row.get(0)?,
    email:         row.get(1)?,
    name:          row.get(2)?,
    role_id:       row.get(3)?,
    created_at:    row.get(4)?,
    password_hash: None,
  })
}

/// Like [`read_user`], for queries that append `password_hash` as column 5.
pub fn read_user_with_hash(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  let mut raw = read_user(row)?;
  raw.password_hash = Some(row.get(5)?);
  Ok(raw)
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         self.id,
      email:      self.email,
      name:       self.name,
      role_id:    self.role_id,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
