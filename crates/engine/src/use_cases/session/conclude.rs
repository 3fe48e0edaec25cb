//! Close a playthrough with the player's accusation.

use std::sync::Arc;

use serde::Serialize;
use whodunit_domain::{Ending, Playthrough, PlaythroughId, UserId};

use super::{AuthorizePlaythrough, SessionError};
use crate::infrastructure::ports::{ClockPort, ContentRepo, PlaythroughRepo};

/// The concluded playthrough plus the scenario's endings for the caller to present.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaythroughConclusion {
    pub playthrough: Playthrough,
    pub endings: Vec<Ending>,
}

pub struct ConcludePlaythrough {
    authorize: Arc<AuthorizePlaythrough>,
    content: Arc<dyn ContentRepo>,
    playthroughs: Arc<dyn PlaythroughRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ConcludePlaythrough {
    pub fn new(
        authorize: Arc<AuthorizePlaythrough>,
        content: Arc<dyn ContentRepo>,
        playthroughs: Arc<dyn PlaythroughRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            authorize,
            content,
            playthroughs,
            clock,
        }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        playthrough_id: PlaythroughId,
        accusation: &str,
    ) -> Result<PlaythroughConclusion, SessionError> {
        let playthrough = self.authorize.execute_active(user_id, playthrough_id).await?;

        let accusation = accusation.trim();
        if accusation.is_empty() {
            return Err(SessionError::EmptyAccusation);
        }

        let now = self.clock.now();
        if !self
            .playthroughs
            .conclude(playthrough_id, accusation, now)
            .await?
        {
            // A concurrent request concluded it first.
            return Err(SessionError::Concluded(playthrough_id));
        }

        let mut concluded = playthrough;
        concluded
            .conclude(accusation, now)
            .map_err(|_| SessionError::Concluded(playthrough_id))?;

        let endings = self.content.list_endings(concluded.scenario_id).await?;
        tracing::info!(%playthrough_id, %user_id, "Playthrough concluded");

        Ok(PlaythroughConclusion {
            playthrough: concluded,
            endings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::session::test_support::{clock, store_with_scenario};
    use whodunit_domain::PlaythroughStatus;

    #[tokio::test]
    async fn conclusion_records_accusation_and_returns_endings() {
        let (store, scenario_id) = store_with_scenario(5).await;
        let ending = Ending::new(scenario_id, "The housekeeper poisoned the tea.");
        store.save_ending(&ending).await.expect("save ending");

        let user = UserId::new();
        let clock = clock();
        let playthrough = Playthrough::new(user, scenario_id, 5, clock.0);
        store.create(&playthrough).await.expect("create");

        let conclude = ConcludePlaythrough::new(
            Arc::new(AuthorizePlaythrough::new(store.clone())),
            store.clone(),
            store.clone(),
            clock.clone(),
        );
        let result = conclude
            .execute(user, playthrough.id, "  The housekeeper ")
            .await
            .expect("concluded");

        assert_eq!(result.playthrough.status, PlaythroughStatus::Concluded);
        assert_eq!(result.playthrough.accusation.as_deref(), Some("The housekeeper"));
        assert_eq!(result.endings, vec![ending]);

        let stored = store
            .get(playthrough.id)
            .await
            .expect("read")
            .expect("exists");
        assert_eq!(stored, result.playthrough);

        assert!(matches!(
            conclude.execute(user, playthrough.id, "The butler").await,
            Err(SessionError::Concluded(_))
        ));
    }

    #[tokio::test]
    async fn blank_accusation_is_rejected() {
        let (store, scenario_id) = store_with_scenario(5).await;
        let user = UserId::new();
        let playthrough = Playthrough::new(user, scenario_id, 5, clock().0);
        store.create(&playthrough).await.expect("create");

        let conclude = ConcludePlaythrough::new(
            Arc::new(AuthorizePlaythrough::new(store.clone())),
            store.clone(),
            store.clone(),
            clock(),
        );
        assert!(matches!(
            conclude.execute(user, playthrough.id, "   ").await,
            Err(SessionError::EmptyAccusation)
        ));
    }
}
