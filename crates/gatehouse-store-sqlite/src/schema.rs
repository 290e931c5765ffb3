//! SQL schema for the Gatehouse SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The UNIQUE constraint on `accounts.email` and the primary key on
/// `external_identities` are what make concurrent first-time logins safe:
/// the losing writer hits a constraint violation and falls back to lookup.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    account_id        TEXT PRIMARY KEY,
    account_type_id   INTEGER NOT NULL,
    name              TEXT NOT NULL,
    email             TEXT UNIQUE,     -- NULL allowed; unique when present
    avatar_url        TEXT,
    provider          TEXT NOT NULL,   -- provider of the most recent login
    status            TEXT NOT NULL,   -- 'active' | 'disabled'
    email_verified_at TEXT,
    last_login_at     TEXT NOT NULL,
    created_at        TEXT NOT NULL,
    credential_secret TEXT NOT NULL    -- placeholder secret; never exposed
);

-- One row per (provider, subject) pair ever used to log in to an account.
-- Pairs accumulate; they are never overwritten by later logins.
CREATE TABLE IF NOT EXISTS external_identities (
    provider   TEXT NOT NULL,
    subject_id TEXT NOT NULL,
    account_id TEXT NOT NULL REFERENCES accounts(account_id),
    linked_at  TEXT NOT NULL,
    PRIMARY KEY (provider, subject_id)
);

-- Only the SHA-256 digest of a credential is stored, never the plaintext.
CREATE TABLE IF NOT EXISTS sessions (
    session_id TEXT PRIMARY KEY,
    account_id TEXT NOT NULL REFERENCES accounts(account_id),
    token_hash TEXT NOT NULL UNIQUE,
    issued_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS identities_account_idx ON external_identities(account_id);
CREATE INDEX IF NOT EXISTS sessions_account_idx   ON sessions(account_id);

PRAGMA user_version = 1;
";
