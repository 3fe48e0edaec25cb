//! Start a new playthrough of a scenario.

use std::sync::Arc;

use whodunit_domain::{Playthrough, ScenarioId, UserId};

use super::SessionError;
use crate::infrastructure::ports::{ClockPort, ContentRepo, PlaythroughRepo};

pub struct CreatePlaythrough {
    content: Arc<dyn ContentRepo>,
    playthroughs: Arc<dyn PlaythroughRepo>,
    clock: Arc<dyn ClockPort>,
}

impl CreatePlaythrough {
    pub fn new(
        content: Arc<dyn ContentRepo>,
        playthroughs: Arc<dyn PlaythroughRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            content,
            playthroughs,
            clock,
        }
    }

    /// Creates an `IN_PROGRESS` playthrough with the scenario's question budget.
    /// Earlier playthroughs of the same user are left untouched.
    pub async fn execute(
        &self,
        user_id: UserId,
        scenario_id: ScenarioId,
    ) -> Result<Playthrough, SessionError> {
        let scenario = self
            .content
            .get_scenario(scenario_id)
            .await?
            .ok_or(SessionError::ScenarioNotFound(scenario_id))?;

        let playthrough = Playthrough::new(
            user_id,
            scenario.id,
            scenario.question_budget,
            self.clock.now(),
        );
        self.playthroughs.create(&playthrough).await?;

        tracing::info!(
            playthrough_id = %playthrough.id,
            %user_id,
            %scenario_id,
            budget = playthrough.remaining_questions,
            "Playthrough created"
        );
        Ok(playthrough)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::session::test_support::{clock, store_with_scenario};
    use whodunit_domain::PlaythroughStatus;

    #[tokio::test]
    async fn new_playthrough_starts_with_scenario_budget() {
        let (store, scenario_id) = store_with_scenario(7).await;
        let clock = clock();
        let create = CreatePlaythrough::new(store.clone(), store.clone(), clock.clone());

        let playthrough = create
            .execute(UserId::new(), scenario_id)
            .await
            .expect("created");
        assert_eq!(playthrough.status, PlaythroughStatus::InProgress);
        assert_eq!(playthrough.remaining_questions, 7);
        assert_eq!(playthrough.created_at, clock.0);

        let stored = store
            .get(playthrough.id)
            .await
            .expect("read")
            .expect("persisted");
        assert_eq!(stored, playthrough);
    }

    #[tokio::test]
    async fn unknown_scenario_is_not_found() {
        let (store, _) = store_with_scenario(7).await;
        let create = CreatePlaythrough::new(store.clone(), store, clock());
        assert!(matches!(
            create.execute(UserId::new(), ScenarioId::new()).await,
            Err(SessionError::ScenarioNotFound(_))
        ));
    }
}
