//! SQLite transcript repository.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use whodunit_domain::{ChatMessage, ChatMessageId, NpcId, PlaythroughId};

use super::connection::SqliteConnection;
use super::row;
use crate::infrastructure::ports::{ChatRepo, RepoError};

const COLUMNS: &str = "id, playthrough_id, npc_id, author, text, highlighted, created_at";

pub struct SqliteChatRepo {
    pool: SqlitePool,
}

impl SqliteChatRepo {
    pub fn new(connection: &SqliteConnection) -> Self {
        Self {
            pool: connection.pool().clone(),
        }
    }
}

fn message_from_row(row: &SqliteRow) -> Result<ChatMessage, RepoError> {
    Ok(ChatMessage {
        id: row::parsed(row, "id")?,
        playthrough_id: row::parsed(row, "playthrough_id")?,
        npc_id: row::parsed(row, "npc_id")?,
        author: row::parsed(row, "author")?,
        text: row::text(row, "text")?,
        highlighted: row::flag(row, "highlighted")?,
        created_at: row::timestamp(row, "created_at")?,
    })
}

#[async_trait]
impl ChatRepo for SqliteChatRepo {
    async fn append(&self, message: &ChatMessage) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages
                (id, playthrough_id, npc_id, author, text, highlighted, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(message.id.to_string())
        .bind(message.playthrough_id.to_string())
        .bind(message.npc_id.to_string())
        .bind(message.author.as_str())
        .bind(&message.text)
        .bind(message.highlighted)
        .bind(row::format_timestamp(message.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("append_message", e))?;

        Ok(())
    }

    async fn get(&self, id: ChatMessageId) -> Result<Option<ChatMessage>, RepoError> {
        let query = format!("SELECT {} FROM chat_messages WHERE id = ?", COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_message", e))?;

        row.as_ref().map(message_from_row).transpose()
    }

    async fn list(
        &self,
        playthrough_id: PlaythroughId,
        npc_id: Option<NpcId>,
    ) -> Result<Vec<ChatMessage>, RepoError> {
        let rows = match npc_id {
            Some(npc_id) => {
                let query = format!(
                    "SELECT {} FROM chat_messages WHERE playthrough_id = ? AND npc_id = ? \
                     ORDER BY created_at, seq",
                    COLUMNS
                );
                sqlx::query(&query)
                    .bind(playthrough_id.to_string())
                    .bind(npc_id.to_string())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {} FROM chat_messages WHERE playthrough_id = ? ORDER BY created_at, seq",
                    COLUMNS
                );
                sqlx::query(&query)
                    .bind(playthrough_id.to_string())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| RepoError::database("list_messages", e))?;

        rows.iter().map(message_from_row).collect()
    }

    async fn list_highlighted(
        &self,
        playthrough_id: PlaythroughId,
    ) -> Result<Vec<ChatMessage>, RepoError> {
        let query = format!(
            "SELECT {} FROM chat_messages WHERE playthrough_id = ? AND highlighted = 1 \
             ORDER BY created_at, seq",
            COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(playthrough_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_highlighted", e))?;

        rows.iter().map(message_from_row).collect()
    }

    async fn set_highlighted(&self, id: ChatMessageId, value: bool) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE chat_messages SET highlighted = ? WHERE id = ?")
            .bind(value)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("set_highlighted", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("ChatMessage", id));
        }
        Ok(())
    }
}
