//! Leaderboard persistence for finished sessions.
//!
//! A small SQLite-backed top-N store: the session manager surfaces a final
//! elapsed time, a caller submits it here with a nickname, and the store
//! keeps only the best results. Stored at `~/.voidgaze/voidgaze.db`.

pub mod migrations;
pub mod schema;
pub mod store;

use std::path::PathBuf;

/// Score store error types.
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("Failed to create data directory: {0}")]
    DirectoryCreation(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Returns the path to the data directory (~/.voidgaze).
fn get_data_directory() -> Result<PathBuf, RankingError> {
    let home = dirs::home_dir().ok_or_else(|| {
        RankingError::DirectoryCreation(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        ))
    })?;

    Ok(home.join(".voidgaze"))
}

/// Returns the path to the score database file (~/.voidgaze/voidgaze.db).
pub fn get_database_path() -> Result<PathBuf, RankingError> {
    Ok(get_data_directory()?.join("voidgaze.db"))
}

pub use store::{RankingStore, ScoreRecord, DEFAULT_LEADERBOARD_SIZE};
