//! Highlight use cases: bookmark transcript lines worth remembering.

use std::sync::Arc;

use whodunit_domain::{ChatMessage, ChatMessageId, UserId};

use crate::infrastructure::ports::{ChatRepo, PlaythroughRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    /// Also returned for messages of other users' playthroughs.
    #[error("Message not found: {0}")]
    NotFound(ChatMessageId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

pub struct SetHighlight {
    chat: Arc<dyn ChatRepo>,
    playthroughs: Arc<dyn PlaythroughRepo>,
}

impl SetHighlight {
    pub fn new(chat: Arc<dyn ChatRepo>, playthroughs: Arc<dyn PlaythroughRepo>) -> Self {
        Self { chat, playthroughs }
    }

    /// Idempotent: setting the current value again succeeds without change.
    pub async fn execute(
        &self,
        user_id: UserId,
        message_id: ChatMessageId,
        highlighted: bool,
    ) -> Result<ChatMessage, HighlightError> {
        let mut message = self
            .chat
            .get(message_id)
            .await?
            .ok_or(HighlightError::NotFound(message_id))?;

        let owned = self
            .playthroughs
            .get(message.playthrough_id)
            .await?
            .is_some_and(|p| p.is_owned_by(user_id));
        if !owned {
            tracing::warn!(
                %message_id,
                %user_id,
                "Highlight rejected for message outside caller's playthroughs"
            );
            return Err(HighlightError::NotFound(message_id));
        }

        if message.highlighted != highlighted {
            self.chat.set_highlighted(message_id, highlighted).await?;
            message.highlighted = highlighted;
        }
        Ok(message)
    }
}
