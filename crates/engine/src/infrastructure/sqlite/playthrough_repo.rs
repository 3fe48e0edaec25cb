//! SQLite playthrough repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use whodunit_domain::{Playthrough, PlaythroughId, PlaythroughStatus, UserId};

use super::connection::SqliteConnection;
use super::row;
use crate::infrastructure::ports::{ChargeOutcome, PlaythroughRepo, RepoError};

const COLUMNS: &str =
    "id, user_id, scenario_id, status, remaining_questions, accusation, created_at, concluded_at";

pub struct SqlitePlaythroughRepo {
    pool: SqlitePool,
}

impl SqlitePlaythroughRepo {
    pub fn new(connection: &SqliteConnection) -> Self {
        Self {
            pool: connection.pool().clone(),
        }
    }

    async fn status(&self, id: PlaythroughId) -> Result<Option<PlaythroughStatus>, RepoError> {
        let row = sqlx::query("SELECT status FROM playthroughs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("playthrough_status", e))?;
        row.as_ref().map(|row| row::parsed(row, "status")).transpose()
    }
}

fn playthrough_from_row(row: &SqliteRow) -> Result<Playthrough, RepoError> {
    Ok(Playthrough {
        id: row::parsed(row, "id")?,
        user_id: row::parsed(row, "user_id")?,
        scenario_id: row::parsed(row, "scenario_id")?,
        status: row::parsed(row, "status")?,
        remaining_questions: row::count(row, "remaining_questions")?,
        accusation: row::opt_text(row, "accusation")?,
        created_at: row::timestamp(row, "created_at")?,
        concluded_at: row::opt_timestamp(row, "concluded_at")?,
    })
}

#[async_trait]
impl PlaythroughRepo for SqlitePlaythroughRepo {
    async fn get(&self, id: PlaythroughId) -> Result<Option<Playthrough>, RepoError> {
        let query = format!("SELECT {} FROM playthroughs WHERE id = ?", COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_playthrough", e))?;

        row.as_ref().map(playthrough_from_row).transpose()
    }

    async fn create(&self, playthrough: &Playthrough) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO playthroughs
                (id, user_id, scenario_id, status, remaining_questions, accusation,
                 created_at, concluded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(playthrough.id.to_string())
        .bind(playthrough.user_id.to_string())
        .bind(playthrough.scenario_id.to_string())
        .bind(playthrough.status.as_str())
        .bind(i64::from(playthrough.remaining_questions))
        .bind(playthrough.accusation.as_deref())
        .bind(row::format_timestamp(playthrough.created_at))
        .bind(playthrough.concluded_at.map(row::format_timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("create_playthrough", e))?;

        tracing::debug!(playthrough_id = %playthrough.id, "Created playthrough");
        Ok(())
    }

    async fn find_active_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Playthrough>, RepoError> {
        let query = format!(
            "SELECT {} FROM playthroughs WHERE user_id = ? AND status = 'IN_PROGRESS' \
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("find_active_playthrough", e))?;

        row.as_ref().map(playthrough_from_row).transpose()
    }

    async fn charge_question(&self, id: PlaythroughId) -> Result<ChargeOutcome, RepoError> {
        // Conditional decrement in a single statement; concurrent callers serialize on the row.
        // The status guard makes a conclusion that lands mid-turn win over the charge.
        let row = sqlx::query(
            r#"
            UPDATE playthroughs
            SET remaining_questions = remaining_questions - 1
            WHERE id = ? AND status = 'IN_PROGRESS' AND remaining_questions > 0
            RETURNING remaining_questions
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("charge_question", e))?;

        match row {
            Some(row) => {
                let remaining: i64 = row
                    .try_get("remaining_questions")
                    .map_err(|e| RepoError::database("charge_question", e))?;
                let remaining = u32::try_from(remaining)
                    .map_err(|e| RepoError::serialization(format!("remaining_questions: {}", e)))?;
                Ok(ChargeOutcome::Charged(remaining))
            }
            None => match self.status(id).await? {
                Some(PlaythroughStatus::InProgress) => Ok(ChargeOutcome::Exhausted),
                Some(PlaythroughStatus::Concluded) => Ok(ChargeOutcome::Concluded),
                None => Err(RepoError::not_found("Playthrough", id)),
            },
        }
    }

    async fn conclude(
        &self,
        id: PlaythroughId,
        accusation: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE playthroughs
            SET status = 'CONCLUDED', accusation = ?, concluded_at = ?
            WHERE id = ? AND status = 'IN_PROGRESS'
            "#,
        )
        .bind(accusation)
        .bind(row::format_timestamp(at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("conclude_playthrough", e))?;

        Ok(result.rows_affected() == 1)
    }
}
