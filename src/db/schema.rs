//! Database schema and migrations for authgate.
//!
//! Migrations are applied in order when the database is first opened or
//! upgraded. The schema_version table tracks which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: credential records
    r#"
-- One row per registered user; username uniqueness is case-sensitive (BINARY collation)
CREATE TABLE users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    username       TEXT NOT NULL UNIQUE,
    password_hash  TEXT NOT NULL           -- Argon2 PHC string
);
"#,
];
