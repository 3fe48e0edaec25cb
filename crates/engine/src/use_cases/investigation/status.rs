//! Which object, if any, the playthrough is currently investigating.

use std::sync::Arc;

use serde::Serialize;
use whodunit_domain::{ObjectId, PlaythroughId, UserId};

use super::InvestigationError;
use crate::entities::{InvestigationTracker, WorldGraph};
use crate::use_cases::session::AuthorizePlaythrough;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveInvestigation {
    pub object_id: ObjectId,
    pub object_name: String,
    pub required_questions: u32,
    pub remaining_questions: u32,
}

pub struct GetInvestigationStatus {
    authorize: Arc<AuthorizePlaythrough>,
    world: Arc<WorldGraph>,
    tracker: Arc<InvestigationTracker>,
}

impl GetInvestigationStatus {
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
    ) -> Result<Option<ActiveInvestigation>, InvestigationError> {
        self.authorize.execute(user_id, playthrough_id).await?;

        let Some(progress) = self.tracker.active(playthrough_id).await? else {
            return Ok(None);
        };
        let object = self.world.object(progress.object_id).await?;

        Ok(Some(ActiveInvestigation {
            object_id: object.id,
            object_name: object.name,
            required_questions: object.required_questions,
            remaining_questions: progress
                .remaining_questions
                .unwrap_or(object.required_questions),
        }))
    }
}
