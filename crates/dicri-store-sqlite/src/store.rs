//! [`SqliteStore`]: the SQLite implementation of [`CaseStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;

use dicri_core::{
  case::{Case, CaseId, CaseRecord},
  evidence::{Evidence, EvidenceId, EvidenceRecord},
  lookup::{LookupKind, LookupRow},
  store::CaseStore,
  user::{Credentials, NewUser, User, UserId, UserPatch},
};

use crate::{
  encode::{
    encode_dt, lookup_table, read_case, read_evidence, read_lookup, read_user,
    read_user_with_hash, RawCase, RawUser, CASE_COLUMNS, EVIDENCE_COLUMNS,
    USER_COLUMNS,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A DICRI case store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!(path = %path.display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Flip `available` off for one row of `table`. Returns whether a live row
  /// was affected.
  async fn soft_delete(&self, table: &'static str, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("UPDATE {table} SET available = 0 WHERE id = ?1 AND available = 1"),
          rusqlite::params![id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }
}

impl CaseStore for SqliteStore {
  type Error = Error;

  // ── Lookups ───────────────────────────────────────────────────────────────

  async fn fetch_lookup(&self, kind: LookupKind) -> Result<Vec<LookupRow>> {
    let table = lookup_table(kind);

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT id, name FROM {table} WHERE available = 1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map([], read_lookup)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  // ── Cases ─────────────────────────────────────────────────────────────────

  async fn fetch_case(&self, id: CaseId) -> Result<Option<Case>> {
    let raw: Option<RawCase> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CASE_COLUMNS} FROM cases WHERE id = ?1 AND available = 1"),
              rusqlite::params![id],
              read_case,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCase::into_case).transpose()
  }

  async fn list_cases(&self) -> Result<Vec<Case>> {
    let raws: Vec<RawCase> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CASE_COLUMNS} FROM cases WHERE available = 1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map([], read_case)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCase::into_case).collect()
  }

  async fn create_case(&self, record: CaseRecord) -> Result<Case> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let r = record.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cases (description, created_at, rejection_justification,
                              technician_id, coordinator_id, state_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            r.description,
            at_str,
            r.rejection_justification,
            r.technician_id,
            r.coordinator_id,
            r.state_id,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Case {
      id,
      description: record.description,
      created_at,
      rejection_justification: record.rejection_justification,
      technician_id: record.technician_id,
      coordinator_id: record.coordinator_id,
      state_id: record.state_id,
    })
  }

  async fn save_case<'a>(&'a self, case: &'a Case) -> Result<bool> {
    let c = case.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE cases
              SET description = ?2,
                  rejection_justification = ?3,
                  technician_id = ?4,
                  coordinator_id = ?5,
                  state_id = ?6
            WHERE id = ?1 AND available = 1",
          rusqlite::params![
            c.id,
            c.description,
            c.rejection_justification,
            c.technician_id,
            c.coordinator_id,
            c.state_id,
          ],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_case(&self, id: CaseId) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE cases SET available = 0 WHERE id = ?1 AND available = 1",
          rusqlite::params![id],
        )?;
        if changed > 0 {
          tx.execute(
            "UPDATE evidence SET available = 0 WHERE case_id = ?1",
            rusqlite::params![id],
          )?;
        }
        tx.commit()?;
        Ok(changed)
      })
      .await?;

    Ok(changed > 0)
  }

  // ── Evidence ──────────────────────────────────────────────────────────────

  async fn fetch_evidence(&self, id: EvidenceId) -> Result<Option<Evidence>> {
    let evidence = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {EVIDENCE_COLUMNS} FROM evidence WHERE id = ?1 AND available = 1"
              ),
              rusqlite::params![id],
              read_evidence,
            )
            .optional()?,
        )
      })
      .await?;

    Ok(evidence)
  }

  async fn list_evidence(&self) -> Result<Vec<Evidence>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVIDENCE_COLUMNS} FROM evidence WHERE available = 1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map([], read_evidence)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  async fn fetch_evidence_by_case(&self, case_id: CaseId) -> Result<Vec<Evidence>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVIDENCE_COLUMNS} FROM evidence
            WHERE case_id = ?1 AND available = 1
            ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![case_id], read_evidence)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows)
  }

  async fn create_evidence(&self, record: EvidenceRecord) -> Result<Evidence> {
    let r = record.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO evidence (description, color, size, weight, location,
                                 technique, technician_id, case_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            r.description,
            r.color,
            r.size,
            r.weight,
            r.location,
            r.technique,
            r.technician_id,
            r.case_id,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Evidence {
      id,
      description: record.description,
      color: record.color,
      size: record.size,
      weight: record.weight,
      location: record.location,
      technique: record.technique,
      technician_id: record.technician_id,
      case_id: record.case_id,
    })
  }

  async fn save_evidence<'a>(&'a self, evidence: &'a Evidence) -> Result<bool> {
    let e = evidence.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE evidence
              SET description = ?2,
                  color = ?3,
                  size = ?4,
                  weight = ?5,
                  location = ?6,
                  technique = ?7,
                  technician_id = ?8,
                  case_id = ?9
            WHERE id = ?1 AND available = 1",
          rusqlite::params![
            e.id,
            e.description,
            e.color,
            e.size,
            e.weight,
            e.location,
            e.technique,
            e.technician_id,
            e.case_id,
          ],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_evidence(&self, id: EvidenceId) -> Result<bool> {
    self.soft_delete("evidence", id).await
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn fetch_user(&self, id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND available = 1"),
              rusqlite::params![id],
              read_user,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users WHERE available = 1 ORDER BY id"
        ))?;
        let rows = stmt
          .query_map([], read_user)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn fetch_credentials<'a>(&'a self, email: &'a str) -> Result<Option<Credentials>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {USER_COLUMNS}, password_hash FROM users
                  WHERE email = ?1 AND available = 1"
              ),
              rusqlite::params![email],
              read_user_with_hash,
            )
            .optional()?,
        )
      })
      .await?;

    let Some(mut raw) = raw else {
      return Ok(None);
    };
    let password_hash = raw.password_hash.take().unwrap_or_default();
    Ok(Some(Credentials { user: raw.into_user()?, password_hash }))
  }

  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);
    let i = input.clone();

    let id: Option<i64> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1 AND available = 1",
            rusqlite::params![i.email],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(None);
        }
        tx.execute(
          "INSERT INTO users (email, name, password_hash, role_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![i.email, i.name, i.password_hash, i.role_id, at_str],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Some(id))
      })
      .await?;

    Ok(id.map(|id| User {
      id,
      email: input.email,
      name: input.name,
      role_id: input.role_id,
      created_at,
    }))
  }

  async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let current = tx
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND available = 1"),
            rusqlite::params![id],
            read_user,
          )
          .optional()?;
        let Some(mut user) = current else {
          return Ok(None);
        };

        if let Some(email) = patch.email {
          user.email = email;
        }
        if let Some(name) = patch.name {
          user.name = name;
        }
        if let Some(role_id) = patch.role_id {
          user.role_id = role_id;
        }

        tx.execute(
          "UPDATE users SET email = ?2, name = ?3, role_id = ?4 WHERE id = ?1",
          rusqlite::params![id, user.email, user.name, user.role_id],
        )?;
        if let Some(hash) = patch.password_hash {
          tx.execute(
            "UPDATE users SET password_hash = ?2 WHERE id = ?1",
            rusqlite::params![id, hash],
          )?;
        }
        tx.commit()?;
        Ok(Some(user))
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn delete_user(&self, id: UserId) -> Result<bool> {
    self.soft_delete("users", id).await
  }
}
