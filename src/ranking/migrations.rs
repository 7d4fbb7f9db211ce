//! Database migration system for the score store.
//!
//! Migrations are versioned and tracked in the `migrations` table.
//! Each migration is run exactly once, in order.

use rusqlite::Connection;

use crate::ranking::schema::{
    CREATE_MIGRATIONS_TABLE, CREATE_SCORES_DURATION_INDEX, CREATE_SCORES_TABLE,
};
use crate::ranking::RankingError;

/// A database migration with a version number, name, and SQL statements.
struct Migration {
    version: i32,
    name: &'static str,
    statements: &'static [&'static str],
}

/// All migrations to be applied, in order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "create_scores_table",
    statements: &[CREATE_SCORES_TABLE, CREATE_SCORES_DURATION_INDEX],
}];

/// Returns the current schema version from the database.
fn get_current_version(conn: &Connection) -> Result<i32, RankingError> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(version)
}

/// Records a migration as applied.
fn record_migration(conn: &Connection, version: i32, name: &str) -> Result<(), RankingError> {
    conn.execute(
        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
        (version, name),
    )?;
    Ok(())
}

/// Runs all pending migrations.
///
/// Migrations are run in a transaction; if any migration fails, all changes
/// are rolled back.
pub fn run_migrations(conn: &mut Connection) -> Result<(), RankingError> {
    // First, ensure the migrations table exists
    conn.execute_batch(CREATE_MIGRATIONS_TABLE)?;

    let current_version = get_current_version(conn)?;
    tracing::info!("Current score store schema version: {}", current_version);

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version)
        .collect();

    if pending.is_empty() {
        tracing::info!("Score store schema is up to date");
        return Ok(());
    }

    tracing::info!("{} pending migration(s) to apply", pending.len());

    for migration in pending {
        tracing::info!(
            "Applying migration {} (v{})",
            migration.name,
            migration.version
        );

        let tx = conn.transaction()?;

        for statement in migration.statements {
            tx.execute_batch(statement).map_err(|e| {
                RankingError::Migration(format!("Migration {} failed: {}", migration.name, e))
            })?;
        }

        record_migration(&tx, migration.version, migration.name)?;
        tx.commit()?;

        tracing::info!("Migration {} applied successfully", migration.name);
    }

    Ok(())
}
