//! SQL schema for the taxdesk SQLite store.
//!
//! Executed on every open. Table and column names match the records kept by
//! earlier deployments and must not change.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS cpas (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT
);

CREATE TABLE IF NOT EXISTS tax_filing_assistants (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT
);

CREATE TABLE IF NOT EXISTS clients (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    name                TEXT,
    address             TEXT,
    income              REAL,
    materials_submitted BOOLEAN NOT NULL DEFAULT FALSE,
    cpa_id              INTEGER REFERENCES cpas(id),
    assistant_id        INTEGER REFERENCES tax_filing_assistants(id)
);

-- At most one row per client is an application rule, not a constraint.
CREATE TABLE IF NOT EXISTS tax_returns (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id            INTEGER REFERENCES clients(id),
    filed_or_not         BOOLEAN NOT NULL DEFAULT FALSE,
    checked_by           TEXT,               -- 'yes' (CPA) | 'no' (assistant)
    tax_return_timestamp INTEGER DEFAULT NULL -- epoch milliseconds, UTC
);

CREATE INDEX IF NOT EXISTS tax_returns_client_idx ON tax_returns(client_id);

PRAGMA user_version = 1;
";
