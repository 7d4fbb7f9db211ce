//! Score records and the leaderboard store.

use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use crate::config::RankingConfig;
use crate::ranking::{get_database_path, migrations::run_migrations, RankingError};

/// Number of records the leaderboard keeps.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Nickname used when the player submits an empty name.
const ANONYMOUS_NICKNAME: &str = "Anonymous";

/// A single leaderboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Unique record id.
    pub id: String,
    /// Player nickname.
    pub nickname: String,
    /// How long the gaze was held, in milliseconds.
    pub duration_ms: u64,
    /// RFC 3339 timestamp of when the score was recorded.
    pub created_at: String,
}

impl ScoreRecord {
    /// Returns the held duration.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Formats the score as `MM:SS.cc`.
    pub fn formatted_score(&self) -> String {
        let total_seconds = self.duration_ms / 1000;
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        let centis = (self.duration_ms % 1000) / 10;
        format!("{minutes:02}:{seconds:02}.{centis:02}")
    }
}

/// SQLite-backed leaderboard, pruned to the top entries.
pub struct RankingStore {
    conn: Connection,
    capacity: usize,
}

impl RankingStore {
    /// Opens the store at the default location, running migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open_default() -> Result<Self, RankingError> {
        let path = get_database_path()?;
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
                tracing::info!("Created data directory at {:?}", dir);
            }
        }
        Self::open(&path)
    }

    /// Opens the store at an explicit path, running migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, RankingError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory store, useful for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail.
    pub fn open_in_memory() -> Result<Self, RankingError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Opens the store at the default location with the configured capacity.
    ///
    /// # Errors
    ///
    /// See [`RankingStore::open_default`].
    pub fn from_config(config: &RankingConfig) -> Result<Self, RankingError> {
        Ok(Self::open_default()?.with_capacity(config.max_records))
    }

    fn from_connection(mut conn: Connection) -> Result<Self, RankingError> {
        run_migrations(&mut conn)?;
        Ok(Self {
            conn,
            capacity: DEFAULT_LEADERBOARD_SIZE,
        })
    }

    /// Overrides the number of entries the leaderboard keeps.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Records a finished session and prunes the board to capacity.
    ///
    /// An empty or whitespace nickname is stored as "Anonymous".
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_record(
        &self,
        nickname: &str,
        duration: Duration,
    ) -> Result<ScoreRecord, RankingError> {
        let nickname = match nickname.trim() {
            "" => ANONYMOUS_NICKNAME,
            trimmed => trimmed,
        };

        let record = ScoreRecord {
            id: Uuid::new_v4().to_string(),
            nickname: nickname.to_string(),
            duration_ms: duration.as_millis() as u64,
            created_at: Utc::now().to_rfc3339(),
        };

        self.conn.execute(
            "INSERT INTO scores (id, nickname, duration_ms, created_at) VALUES (?1, ?2, ?3, ?4)",
            (
                &record.id,
                &record.nickname,
                record.duration_ms as i64,
                &record.created_at,
            ),
        )?;

        let pruned = self.prune_to_capacity()?;
        if pruned > 0 {
            tracing::debug!("Pruned {} record(s) below the leaderboard cutoff", pruned);
        }

        tracing::info!(
            "Recorded score {} for {}",
            record.formatted_score(),
            record.nickname
        );
        Ok(record)
    }

    /// Returns the top records, longest hold first.
    ///
    /// Ties are broken by recency (earlier submission ranks higher).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn top_records(&self, limit: usize) -> Result<Vec<ScoreRecord>, RankingError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, nickname, duration_ms, created_at FROM scores
             ORDER BY duration_ms DESC, created_at ASC
             LIMIT ?1",
        )?;

        let records = stmt
            .query_map([limit as i64], |row| {
                Ok(ScoreRecord {
                    id: row.get(0)?,
                    nickname: row.get(1)?,
                    duration_ms: row.get::<_, i64>(2)? as u64,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Returns the full leaderboard (up to capacity).
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn leaderboard(&self) -> Result<Vec<ScoreRecord>, RankingError> {
        self.top_records(self.capacity)
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_records(&self) -> Result<usize, RankingError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scores", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Deletes all records.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear_records(&self) -> Result<(), RankingError> {
        self.conn.execute("DELETE FROM scores", [])?;
        tracing::info!("Cleared all leaderboard records");
        Ok(())
    }

    /// Deletes records ranked below the leaderboard capacity.
    fn prune_to_capacity(&self) -> Result<usize, RankingError> {
        let deleted = self.conn.execute(
            "DELETE FROM scores WHERE id NOT IN (
                SELECT id FROM scores
                ORDER BY duration_ms DESC, created_at ASC
                LIMIT ?1
            )",
            [self.capacity as i64],
        )?;
        Ok(deleted)
    }
}
