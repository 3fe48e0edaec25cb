//! Find the playthrough a returning user should continue.

use std::sync::Arc;

use serde::Serialize;
use whodunit_domain::{PlaythroughId, ScenarioId, UserId};

use super::SessionError;
use crate::infrastructure::ports::{ContentRepo, PlaythroughRepo};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaythroughSummary {
    pub playthrough_id: PlaythroughId,
    pub scenario_id: ScenarioId,
    pub scenario_title: String,
    pub remaining_questions: u32,
}

pub struct ResumeActive {
    content: Arc<dyn ContentRepo>,
    playthroughs: Arc<dyn PlaythroughRepo>,
}

impl ResumeActive {
    pub fn new(content: Arc<dyn ContentRepo>, playthroughs: Arc<dyn PlaythroughRepo>) -> Self {
        Self {
            content,
            playthroughs,
        }
    }

    /// The user's most recently created in-progress playthrough.
    pub async fn execute(&self, user_id: UserId) -> Result<PlaythroughSummary, SessionError> {
        let playthrough = self
            .playthroughs
            .find_active_for_user(user_id)
            .await?
            .ok_or(SessionError::NoActiveSession)?;

        let scenario = self
            .content
            .get_scenario(playthrough.scenario_id)
            .await?
            .ok_or(SessionError::ScenarioNotFound(playthrough.scenario_id))?;

        Ok(PlaythroughSummary {
            playthrough_id: playthrough.id,
            scenario_id: scenario.id,
            scenario_title: scenario.title,
            remaining_questions: playthrough.remaining_questions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::session::test_support::store_with_scenario;
    use chrono::{Duration, TimeZone, Utc};
    use whodunit_domain::Playthrough;

    #[tokio::test]
    async fn most_recent_playthrough_wins() {
        let (store, scenario_id) = store_with_scenario(5).await;
        let user = UserId::new();
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("time");
        let older = Playthrough::new(user, scenario_id, 5, t0);
        let newer = Playthrough::new(user, scenario_id, 5, t0 + Duration::hours(1));
        store.create(&newer).await.expect("create");
        store.create(&older).await.expect("create");

        let resume = ResumeActive::new(store.clone(), store);
        let summary = resume.execute(user).await.expect("resumable");
        assert_eq!(summary.playthrough_id, newer.id);
        assert_eq!(summary.scenario_title, "The Blackwood Affair");
    }

    #[tokio::test]
    async fn user_without_playthroughs_has_no_session() {
        let (store, _) = store_with_scenario(5).await;
        let resume = ResumeActive::new(store.clone(), store);
        assert!(matches!(
            resume.execute(UserId::new()).await,
            Err(SessionError::NoActiveSession)
        ));
    }
}
