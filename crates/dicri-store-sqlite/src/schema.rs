//! SQL schema for the DICRI SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL plus the fixed lookup catalogs; idempotent thanks to
/// `IF NOT EXISTS` and `INSERT OR IGNORE`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS roles (
    id        INTEGER PRIMARY KEY,
    name      TEXT    NOT NULL,
    available INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS case_states (
    id        INTEGER PRIMARY KEY,
    name      TEXT    NOT NULL,
    available INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT    NOT NULL,
    name          TEXT    NOT NULL,
    password_hash TEXT    NOT NULL,   -- argon2 PHC string
    role_id       INTEGER REFERENCES roles(id),
    created_at    TEXT    NOT NULL,   -- ISO 8601 UTC; server-assigned
    available     INTEGER NOT NULL DEFAULT 1
);

-- Deleted users free their email address.
CREATE UNIQUE INDEX IF NOT EXISTS users_email_idx ON users(email) WHERE available = 1;

CREATE TABLE IF NOT EXISTS cases (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    description             TEXT    NOT NULL,
    created_at              TEXT    NOT NULL,
    rejection_justification TEXT,   -- non-NULL exactly when rejected
    technician_id           INTEGER NOT NULL REFERENCES users(id),
    coordinator_id          INTEGER NOT NULL REFERENCES users(id),
    state_id                INTEGER NOT NULL REFERENCES case_states(id),
    available               INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS evidence (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    description   TEXT    NOT NULL,
    color         TEXT,
    size          TEXT,
    weight        TEXT,
    location      TEXT,
    technique     TEXT,
    technician_id INTEGER NOT NULL REFERENCES users(id),
    case_id       INTEGER NOT NULL REFERENCES cases(id),
    available     INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS cases_technician_idx  ON cases(technician_id);
CREATE INDEX IF NOT EXISTS cases_coordinator_idx ON cases(coordinator_id);
CREATE INDEX IF NOT EXISTS evidence_case_idx     ON evidence(case_id);

INSERT OR IGNORE INTO roles (id, name) VALUES
    (1, 'Administrador'),
    (2, 'Tecnico'),
    (3, 'Coordinador');

INSERT OR IGNORE INTO case_states (id, name) VALUES
    (1, 'Abierto'),
    (2, 'En proceso'),
    (3, 'Rechazado'),
    (4, 'Aprobado');

PRAGMA user_version = 1;
";
