//! Ownership and lifecycle checks shared by every playthrough-scoped operation.

use std::sync::Arc;

use whodunit_domain::{Playthrough, PlaythroughId, UserId};

use super::SessionError;
use crate::infrastructure::ports::PlaythroughRepo;

pub struct AuthorizePlaythrough {
    playthroughs: Arc<dyn PlaythroughRepo>,
}

impl AuthorizePlaythrough {
    pub fn new(playthroughs: Arc<dyn PlaythroughRepo>) -> Self {
        Self { playthroughs }
    }

    /// Load a playthrough the caller owns.
    pub async fn execute(
        &self,
        user_id: UserId,
        playthrough_id: PlaythroughId,
    ) -> Result<Playthrough, SessionError> {
        let playthrough = self
            .playthroughs
            .get(playthrough_id)
            .await?
            .ok_or(SessionError::PlaythroughNotFound(playthrough_id))?;

        if !playthrough.is_owned_by(user_id) {
            tracing::warn!(
                %playthrough_id,
                %user_id,
                "Rejected access to another user's playthrough"
            );
            return Err(SessionError::Forbidden);
        }
        Ok(playthrough)
    }

    /// As [`Self::execute`], additionally requiring the playthrough to still be in progress.
    pub async fn execute_active(
        &self,
        user_id: UserId,
        playthrough_id: PlaythroughId,
    ) -> Result<Playthrough, SessionError> {
        let playthrough = self.execute(user_id, playthrough_id).await?;
        if !playthrough.is_in_progress() {
            return Err(SessionError::Concluded(playthrough_id));
        }
        Ok(playthrough)
    }
}
