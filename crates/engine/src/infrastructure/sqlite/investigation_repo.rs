//! SQLite investigation progress repository.
//!
//! The partial unique index on `object_progress(playthrough_id) WHERE in_investigation = 1`
//! backs the single-active-investigation rule; the conditional upsert in
//! [`SqliteInvestigationRepo::try_start`] keeps the common conflict path free of errors.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use whodunit_domain::{ObjectId, ObjectProgress, PlaythroughId};

use super::connection::SqliteConnection;
use super::row;
use crate::infrastructure::ports::{InvestigationRepo, RepoError, StartOutcome};

const COLUMNS: &str = "playthrough_id, object_id, remaining_questions, in_investigation";
const START_ATTEMPTS: usize = 2;

pub struct SqliteInvestigationRepo {
    pool: SqlitePool,
}

impl SqliteInvestigationRepo {
    pub fn new(connection: &SqliteConnection) -> Self {
        Self {
            pool: connection.pool().clone(),
        }
    }

    /// Activate the object unless some object is already active. Returns whether a row changed.
    async fn activate(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
        required_questions: u32,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            INSERT INTO object_progress
                (playthrough_id, object_id, remaining_questions, in_investigation)
            SELECT ?, ?, ?, 1
            WHERE NOT EXISTS (
                SELECT 1 FROM object_progress WHERE playthrough_id = ? AND in_investigation = 1
            )
            ON CONFLICT (playthrough_id, object_id) DO UPDATE SET
                in_investigation = 1,
                remaining_questions =
                    COALESCE(object_progress.remaining_questions, excluded.remaining_questions)
            "#,
        )
        .bind(playthrough_id.to_string())
        .bind(object_id.to_string())
        .bind(i64::from(required_questions))
        .bind(playthrough_id.to_string())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            // Lost a race against another start: the unique index rejected a second active row.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(false),
            Err(e) => Err(RepoError::database("start_investigation", e)),
        }
    }
}

fn progress_from_row(row: &SqliteRow) -> Result<ObjectProgress, RepoError> {
    Ok(ObjectProgress {
        playthrough_id: row::parsed(row, "playthrough_id")?,
        object_id: row::parsed(row, "object_id")?,
        remaining_questions: row::opt_count(row, "remaining_questions")?,
        in_investigation: row::flag(row, "in_investigation")?,
    })
}

#[async_trait]
impl InvestigationRepo for SqliteInvestigationRepo {
    async fn get_progress(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
    ) -> Result<Option<ObjectProgress>, RepoError> {
        let query = format!(
            "SELECT {} FROM object_progress WHERE playthrough_id = ? AND object_id = ?",
            COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(playthrough_id.to_string())
            .bind(object_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_progress", e))?;

        row.as_ref().map(progress_from_row).transpose()
    }

    async fn find_active(
        &self,
        playthrough_id: PlaythroughId,
    ) -> Result<Option<ObjectProgress>, RepoError> {
        let query = format!(
            "SELECT {} FROM object_progress WHERE playthrough_id = ? AND in_investigation = 1",
            COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(playthrough_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("find_active_investigation", e))?;

        row.as_ref().map(progress_from_row).transpose()
    }

    async fn try_start(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
        required_questions: u32,
    ) -> Result<StartOutcome, RepoError> {
        for _ in 0..START_ATTEMPTS {
            if self
                .activate(playthrough_id, object_id, required_questions)
                .await?
            {
                let progress = self
                    .get_progress(playthrough_id, object_id)
                    .await?
                    .ok_or_else(|| RepoError::not_found("ObjectProgress", object_id))?;
                return Ok(StartOutcome::Started(progress));
            }

            match self.find_active(playthrough_id).await? {
                Some(active) if active.object_id == object_id => {
                    return Ok(StartOutcome::AlreadyStarted(active));
                }
                Some(active) => {
                    return Ok(StartOutcome::Conflict {
                        active_object_id: active.object_id,
                    });
                }
                // The active investigation completed between the two statements.
                None => continue,
            }
        }

        Err(RepoError::constraint(format!(
            "could not start investigation of {} in playthrough {}",
            object_id, playthrough_id
        )))
    }

    async fn record_question(
        &self,
        playthrough_id: PlaythroughId,
    ) -> Result<Option<ObjectProgress>, RepoError> {
        let query = format!(
            r#"
            UPDATE object_progress
            SET remaining_questions = MAX(COALESCE(remaining_questions, 0) - 1, 0)
            WHERE playthrough_id = ? AND in_investigation = 1
            RETURNING {}
            "#,
            COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(playthrough_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("record_question", e))?;

        row.as_ref().map(progress_from_row).transpose()
    }

    async fn try_complete(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
    ) -> Result<Option<ObjectProgress>, RepoError> {
        let query = format!(
            r#"
            UPDATE object_progress
            SET in_investigation = 0
            WHERE playthrough_id = ? AND object_id = ? AND in_investigation = 1
            RETURNING {}
            "#,
            COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(playthrough_id.to_string())
            .bind(object_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("complete_investigation", e))?;

        row.as_ref().map(progress_from_row).transpose()
    }
}
