//! Per-object investigation progress within a playthrough.

use std::sync::Arc;

use whodunit_domain::{InteractiveObject, ObjectId, ObjectProgress, PlaythroughId};

use crate::infrastructure::ports::{InvestigationRepo, RepoError, StartOutcome};

/// Tracks which object a playthrough is investigating and how many questions remain.
pub struct InvestigationTracker {
    repo: Arc<dyn InvestigationRepo>,
}

impl InvestigationTracker {
    pub fn new(repo: Arc<dyn InvestigationRepo>) -> Self {
        Self { repo }
    }

    pub async fn start(
        &self,
        playthrough_id: PlaythroughId,
        object: &InteractiveObject,
    ) -> Result<StartOutcome, RepoError> {
        self.repo
            .try_start(playthrough_id, object.id, object.required_questions)
            .await
    }

    pub async fn complete(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
    ) -> Result<Option<ObjectProgress>, RepoError> {
        self.repo.try_complete(playthrough_id, object_id).await
    }

    /// Count one question against the active investigation, if there is one.
    pub async fn record_question(
        &self,
        playthrough_id: PlaythroughId,
    ) -> Result<Option<ObjectProgress>, RepoError> {
        self.repo.record_question(playthrough_id).await
    }

    pub async fn active(
        &self,
        playthrough_id: PlaythroughId,
    ) -> Result<Option<ObjectProgress>, RepoError> {
        self.repo.find_active(playthrough_id).await
    }

    /// Progress for one object; objects never touched read as unstarted.
    #[cfg(test)]
    pub async fn progress(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
    ) -> Result<ObjectProgress, RepoError> {
        Ok(self
            .repo
            .get_progress(playthrough_id, object_id)
            .await?
            .unwrap_or_else(|| ObjectProgress::unstarted(playthrough_id, object_id)))
    }
}
