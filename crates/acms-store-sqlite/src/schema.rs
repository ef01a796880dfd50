//! SQL schema for the ACMS SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS complaints (
    complaint_id        TEXT PRIMARY KEY,
    tracking_id         TEXT NOT NULL UNIQUE,  -- public lookup key; never updated
    title               TEXT NOT NULL,
    description         TEXT NOT NULL,
    category            TEXT NOT NULL,   -- 'academic' | 'facility' | 'staff' | 'others'
    priority            TEXT NOT NULL,   -- 'low' | 'medium' | 'high'
    department          TEXT,
    location            TEXT,
    contact_email       TEXT,
    expected_resolution TEXT,            -- YYYY-MM-DD
    submitter           TEXT NOT NULL,   -- JSON-encoded Submitter
    status              TEXT NOT NULL DEFAULT 'pending',
    admin_notes         TEXT,
    resolution_notes    TEXT,
    created_at          TEXT NOT NULL,   -- RFC 3339 UTC, fixed width
    updated_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS polls (
    poll_id     TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    kind        TEXT NOT NULL,           -- 'yes_no' | 'multiple_choice'
    created_at  TEXT NOT NULL,
    expires_at  TEXT NOT NULL
);

-- Naive counters: one row per option, incremented in place.
CREATE TABLE IF NOT EXISTS poll_options (
    poll_id  TEXT NOT NULL REFERENCES polls(poll_id),
    position INTEGER NOT NULL,
    label    TEXT NOT NULL,
    votes    INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (poll_id, position),
    UNIQUE (poll_id, label)
);

CREATE INDEX IF NOT EXISTS complaints_status_idx  ON complaints(status);
CREATE INDEX IF NOT EXISTS complaints_created_idx ON complaints(created_at);

PRAGMA user_version = 1;
";
