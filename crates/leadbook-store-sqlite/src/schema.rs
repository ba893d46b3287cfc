//! SQL schema for the Leadbook SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS leads (
    id                TEXT PRIMARY KEY,
    first_name        TEXT NOT NULL,
    last_name         TEXT NOT NULL,
    email             TEXT NOT NULL,   -- trimmed + lower-cased before insert
    phone             TEXT,
    company           TEXT,
    job_title         TEXT,
    lead_source       TEXT NOT NULL DEFAULT 'Other',
    lead_status       TEXT NOT NULL DEFAULT 'New',
    assigned_to       TEXT,
    estimated_value   REAL NOT NULL DEFAULT 0 CHECK (estimated_value >= 0),
    notes             TEXT,
    tags              TEXT NOT NULL DEFAULT '[]',
    last_contact_date TEXT,            -- fixed-width RFC 3339 UTC or NULL
    created_at        TEXT NOT NULL,   -- fixed-width RFC 3339 UTC
    updated_at        TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS leads_email_idx   ON leads(email);
CREATE INDEX        IF NOT EXISTS leads_created_idx ON leads(created_at DESC);
CREATE INDEX        IF NOT EXISTS leads_status_idx  ON leads(lead_status);

PRAGMA user_version = 1;
";
