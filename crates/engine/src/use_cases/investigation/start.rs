//! Begin investigating an object.

use std::sync::Arc;

use serde::Serialize;
use whodunit_domain::{ObjectId, PlaythroughId, UserId};

use super::InvestigationError;
use crate::entities::{InvestigationTracker, WorldGraph};
use crate::infrastructure::ports::StartOutcome;
use crate::use_cases::session::AuthorizePlaythrough;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestigationStarted {
    pub object_id: ObjectId,
    pub required_questions: u32,
    pub remaining_questions: u32,
    /// The object was already the active investigation; nothing changed.
    pub already_started: bool,
}

pub struct StartInvestigation {
    authorize: Arc<AuthorizePlaythrough>,
    world: Arc<WorldGraph>,
    tracker: Arc<InvestigationTracker>,
}

impl StartInvestigation {
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

    pub async fn execute(
        &self,
        user_id: UserId,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
    ) -> Result<InvestigationStarted, InvestigationError> {
        let playthrough = self.authorize.execute_active(user_id, playthrough_id).await?;
        let (object, _room) = self
            .world
            .object_in_scenario(object_id, playthrough.scenario_id)
            .await?;

        let (progress, already_started) = match self.tracker.start(playthrough_id, &object).await? {
            StartOutcome::Started(progress) => {
                tracing::info!(%playthrough_id, %object_id, "Investigation started");
                (progress, false)
            }
            StartOutcome::AlreadyStarted(progress) => (progress, true),
            StartOutcome::Conflict { active_object_id } => {
                tracing::warn!(
                    %playthrough_id,
                    %object_id,
                    %active_object_id,
                    "Investigation start rejected, another object is active"
                );
                return Err(InvestigationError::Conflict { active_object_id });
            }
        };

        Ok(InvestigationStarted {
            object_id,
            required_questions: object.required_questions,
            remaining_questions: progress
                .remaining_questions
                .unwrap_or(object.required_questions),
            already_started,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{evidence, fixture};
    use super::*;
    use crate::entities::WorldError;
    use crate::use_cases::session::SessionError;

    #[tokio::test]
    async fn restarting_active_object_is_idempotent() {
        let f = fixture().await;
        let object = evidence(&f, "Teacup", "Traces of arsenic.").await;

        f.use_cases
            .start
            .execute(f.user, f.playthrough_id, object.id)
            .await
            .expect("first start");
        let again = f
            .use_cases
            .start
            .execute(f.user, f.playthrough_id, object.id)
            .await
            .expect("second start");

        assert!(again.already_started);
        assert_eq!(again.remaining_questions, 3);
    }

    #[tokio::test]
    async fn unknown_object_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            f.use_cases
                .start
                .execute(f.user, f.playthrough_id, ObjectId::new())
                .await,
            Err(InvestigationError::World(WorldError::ObjectNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn other_users_cannot_start() {
        let f = fixture().await;
        let object = evidence(&f, "Teacup", "Traces of arsenic.").await;
        assert!(matches!(
            f.use_cases
                .start
                .execute(UserId::new(), f.playthrough_id, object.id)
                .await,
            Err(InvestigationError::Session(SessionError::Forbidden))
        ));
    }
}
