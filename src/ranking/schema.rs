//! Database schema definitions for the score store.
//!
//! Contains SQL statements for creating and managing leaderboard tables.

/// SQL statement to create the migrations tracking table.
pub const CREATE_MIGRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// SQL statement to create the scores table.
pub const CREATE_SCORES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS scores (
    id TEXT PRIMARY KEY,
    nickname TEXT NOT NULL,
    duration_ms INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
"#;

/// SQL statement to create an index on duration for leaderboard queries.
pub const CREATE_SCORES_DURATION_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_scores_duration_ms ON scores(duration_ms DESC);
"#;
