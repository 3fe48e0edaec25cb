//! Transcript reads.

use std::sync::Arc;

use whodunit_domain::{ChatMessage, NpcId, PlaythroughId, UserId};

use super::DialogueError;
use crate::infrastructure::ports::ChatRepo;
use crate::use_cases::session::AuthorizePlaythrough;

/// A playthrough's transcript, oldest first, optionally for a single NPC.
pub struct GetHistory {
    authorize: Arc<AuthorizePlaythrough>,
    chat: Arc<dyn ChatRepo>,
}

impl GetHistory {
    pub fn new(authorize: Arc<AuthorizePlaythrough>, chat: Arc<dyn ChatRepo>) -> Self {
        Self { authorize, chat }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        playthrough_id: PlaythroughId,
        npc_id: Option<NpcId>,
    ) -> Result<Vec<ChatMessage>, DialogueError> {
        self.authorize.execute(user_id, playthrough_id).await?;
        Ok(self.chat.list(playthrough_id, npc_id).await?)
    }
}

/// Highlighted messages across every NPC of a playthrough, oldest first.
pub struct GetHighlightedHistory {
    authorize: Arc<AuthorizePlaythrough>,
    chat: Arc<dyn ChatRepo>,
}

impl GetHighlightedHistory {
    pub fn new(authorize: Arc<AuthorizePlaythrough>, chat: Arc<dyn ChatRepo>) -> Self {
        Self { authorize, chat }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        playthrough_id: PlaythroughId,
    ) -> Result<Vec<ChatMessage>, DialogueError> {
        self.authorize.execute(user_id, playthrough_id).await?;
        Ok(self.chat.list_highlighted(playthrough_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use whodunit_domain::{NpcId, Playthrough};

    use super::*;
    use crate::infrastructure::in_memory::InMemoryStore;
    use crate::infrastructure::ports::PlaythroughRepo;
    use crate::use_cases::session::test_support::store_with_scenario;
    use crate::use_cases::session::SessionError;

    struct Fixture {
        store: Arc<InMemoryStore>,
        user: UserId,
        playthrough_id: PlaythroughId,
        butler: NpcId,
        cook: NpcId,
    }

    async fn fixture() -> Fixture {
        let (store, scenario_id) = store_with_scenario(10).await;
        let user = UserId::new();
        let playthrough = Playthrough::new(user, scenario_id, 10, Utc::now());
        store.create(&playthrough).await.expect("create");
        Fixture {
            store,
            user,
            playthrough_id: playthrough.id,
            butler: NpcId::new(),
            cook: NpcId::new(),
        }
    }

    fn history(f: &Fixture) -> GetHistory {
        GetHistory::new(
            Arc::new(AuthorizePlaythrough::new(f.store.clone())),
            f.store.clone(),
        )
    }

    fn highlighted(f: &Fixture) -> GetHighlightedHistory {
        GetHighlightedHistory::new(
            Arc::new(AuthorizePlaythrough::new(f.store.clone())),
            f.store.clone(),
        )
    }

    /// Appends out of time order so only the timestamps decide the result.
    async fn seed_conversations(f: &Fixture) -> Vec<ChatMessage> {
        let base = Utc::now();
        let at = |seconds| base + Duration::seconds(seconds);
        let messages = vec![
            ChatMessage::from_user(f.playthrough_id, f.cook, "Who baked the cake?", at(3)),
            ChatMessage::from_user(f.playthrough_id, f.butler, "Where were you?", at(1)),
            ChatMessage::from_npc(f.playthrough_id, f.cook, "I did, madam.", at(4)),
            ChatMessage::from_npc(f.playthrough_id, f.butler, "In the pantry.", at(2)),
        ];
        for message in &messages {
            f.store.append(message).await.expect("append");
        }
        messages
    }

    fn texts(messages: &[ChatMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.text.as_str()).collect()
    }

    #[tokio::test]
    async fn unfiltered_history_interleaves_npcs_by_time() {
        let f = fixture().await;
        seed_conversations(&f).await;

        let all = history(&f)
            .execute(f.user, f.playthrough_id, None)
            .await
            .expect("history");
        assert_eq!(
            texts(&all),
            [
                "Where were you?",
                "In the pantry.",
                "Who baked the cake?",
                "I did, madam."
            ]
        );

        let cook_only = history(&f)
            .execute(f.user, f.playthrough_id, Some(f.cook))
            .await
            .expect("history");
        assert_eq!(texts(&cook_only), ["Who baked the cake?", "I did, madam."]);
    }

    #[tokio::test]
    async fn highlights_from_every_npc_come_back_oldest_first() {
        let f = fixture().await;
        let messages = seed_conversations(&f).await;
        // Marked newest first.
        for index in [2, 3] {
            f.store
                .set_highlighted(messages[index].id, true)
                .await
                .expect("highlight");
        }

        let marked = highlighted(&f)
            .execute(f.user, f.playthrough_id)
            .await
            .expect("highlights");
        assert_eq!(texts(&marked), ["In the pantry.", "I did, madam."]);
        assert!(marked.iter().all(|m| m.highlighted));
    }

    #[tokio::test]
    async fn another_users_history_is_forbidden() {
        let f = fixture().await;
        seed_conversations(&f).await;
        let stranger = UserId::new();

        assert!(matches!(
            history(&f).execute(stranger, f.playthrough_id, None).await,
            Err(DialogueError::Session(SessionError::Forbidden))
        ));
        assert!(matches!(
            highlighted(&f).execute(stranger, f.playthrough_id).await,
            Err(DialogueError::Session(SessionError::Forbidden))
        ));
    }

    #[tokio::test]
    async fn unknown_playthrough_is_not_found() {
        let f = fixture().await;
        let missing = PlaythroughId::new();

        assert!(matches!(
            history(&f).execute(f.user, missing, None).await,
            Err(DialogueError::Session(SessionError::PlaythroughNotFound(id))) if id == missing
        ));
        assert!(matches!(
            highlighted(&f).execute(f.user, missing).await,
            Err(DialogueError::Session(SessionError::PlaythroughNotFound(id))) if id == missing
        ));
    }
}
