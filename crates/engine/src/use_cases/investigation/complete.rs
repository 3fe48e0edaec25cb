//! Finish investigating an object and reveal its detail.

use std::sync::Arc;

use serde::Serialize;
use whodunit_domain::{ObjectId, PlaythroughId, UserId};

use super::InvestigationError;
use crate::entities::{InvestigationTracker, WorldGraph};
use crate::use_cases::session::AuthorizePlaythrough;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestigationCompleted {
    pub object_id: ObjectId,
    pub detail_content: String,
    /// Questions left on the counter when the investigation was closed.
    pub remaining_questions: u32,
}

pub struct CompleteInvestigation {
    authorize: Arc<AuthorizePlaythrough>,
    world: Arc<WorldGraph>,
    tracker: Arc<InvestigationTracker>,
}

impl CompleteInvestigation {
    pub fn new(
        authorize: Arc<AuthorizePlaythrough>,
        world: Arc<WorldGraph>,
        tracker: Arc<InvestigationTracker>,
    ) -> Self {
        Self {
            authorize,
            world,
            tracker,
        }
    }

    /// Completion is allowed whatever the counter reads; it is not gated on zero.
    pub async fn execute(
        &self,
        user_id: UserId,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
    ) -> Result<InvestigationCompleted, InvestigationError> {
        let playthrough = self.authorize.execute_active(user_id, playthrough_id).await?;
        let (object, _room) = self
            .world
            .object_in_scenario(object_id, playthrough.scenario_id)
            .await?;

        let progress = self
            .tracker
            .complete(playthrough_id, object_id)
            .await?
            .ok_or(InvestigationError::NotInProgress(object_id))?;

        tracing::info!(%playthrough_id, %object_id, "Investigation completed");
        Ok(InvestigationCompleted {
            object_id,
            detail_content: object.detail_content(),
            remaining_questions: progress.remaining_questions.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{evidence, fixture};
    use super::*;
    use whodunit_domain::InvestigationState;

    #[tokio::test]
    async fn completing_idle_object_is_not_in_progress() {
        let f = fixture().await;
        let object = evidence(&f, "Teacup", "Traces of arsenic.").await;
        assert!(matches!(
            f.use_cases
                .complete
                .execute(f.user, f.playthrough_id, object.id)
                .await,
            Err(InvestigationError::NotInProgress(id)) if id == object.id
        ));
    }

    #[tokio::test]
    async fn completion_keeps_the_counter() {
        let f = fixture().await;
        let object = evidence(&f, "Teacup", "Traces of arsenic.").await;
        f.use_cases
            .start
            .execute(f.user, f.playthrough_id, object.id)
            .await
            .expect("start");

        let done = f
            .use_cases
            .complete
            .execute(f.user, f.playthrough_id, object.id)
            .await
            .expect("complete");
        assert_eq!(done.remaining_questions, 3);

        let tracker = InvestigationTracker::new(f.store.clone());
        let progress = tracker
            .progress(f.playthrough_id, object.id)
            .await
            .expect("read");
        assert_eq!(progress.state(), InvestigationState::Completed);
        assert_eq!(progress.remaining_questions, Some(3));
    }
}
