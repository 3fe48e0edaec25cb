//! SQLite connection management

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

/// Schema statements, applied in order on every start.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS scenarios (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        setting TEXT NOT NULL,
        background_script TEXT NOT NULL,
        question_budget INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS rooms (
        id TEXT PRIMARY KEY,
        scenario_id TEXT NOT NULL REFERENCES scenarios(id),
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        background_asset TEXT,
        sort_order INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_rooms_scenario ON rooms (scenario_id, sort_order)",
    r#"
    CREATE TABLE IF NOT EXISTS interactive_objects (
        id TEXT PRIMARY KEY,
        room_id TEXT NOT NULL REFERENCES rooms(id),
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        kind TEXT NOT NULL,
        payload_json TEXT NOT NULL,
        placement_json TEXT,
        is_visible INTEGER NOT NULL,
        required_questions INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_objects_room ON interactive_objects (room_id)",
    r#"
    CREATE TABLE IF NOT EXISTS npcs (
        id TEXT PRIMARY KEY,
        room_id TEXT NOT NULL REFERENCES rooms(id),
        name TEXT NOT NULL,
        persona TEXT NOT NULL,
        portrait_asset TEXT,
        sort_order INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_npcs_room ON npcs (room_id, sort_order)",
    r#"
    CREATE TABLE IF NOT EXISTS endings (
        id TEXT PRIMARY KEY,
        scenario_id TEXT NOT NULL REFERENCES scenarios(id),
        resolution TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS playthroughs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        scenario_id TEXT NOT NULL REFERENCES scenarios(id),
        status TEXT NOT NULL,
        remaining_questions INTEGER NOT NULL CHECK (remaining_questions >= 0),
        accusation TEXT,
        created_at TEXT NOT NULL,
        concluded_at TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_playthroughs_user ON playthroughs (user_id, status, created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS object_progress (
        playthrough_id TEXT NOT NULL REFERENCES playthroughs(id),
        object_id TEXT NOT NULL,
        remaining_questions INTEGER,
        in_investigation INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (playthrough_id, object_id)
    )
    "#,
    // At most one active investigation per playthrough, enforced by the store.
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_object_progress_single_active
        ON object_progress (playthrough_id) WHERE in_investigation = 1
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chat_messages (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        playthrough_id TEXT NOT NULL REFERENCES playthroughs(id),
        npc_id TEXT NOT NULL,
        author TEXT NOT NULL,
        text TEXT NOT NULL,
        highlighted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_chat_thread ON chat_messages (playthrough_id, npc_id, created_at)",
];

/// Shared SQLite pool
#[derive(Clone)]
pub struct SqliteConnection {
    pool: SqlitePool,
}

impl SqliteConnection {
    /// Open (creating if missing) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| RepoError::database("connect", e))?;

        tracing::info!(path = %path.as_ref().display(), "Opened SQLite database");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist yet.
    pub async fn initialize_schema(&self) -> Result<(), RepoError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::database("initialize_schema", e))?;
        }
        tracing::debug!(statements = SCHEMA.len(), "SQLite schema ensured");
        Ok(())
    }
}
