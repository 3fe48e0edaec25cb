//! Session use cases: playthrough lifecycle and ownership checks.

mod authorize;
mod conclude;
mod create;
mod resume;

pub use authorize::AuthorizePlaythrough;
pub use conclude::{ConcludePlaythrough, PlaythroughConclusion};
pub use create::CreatePlaythrough;
pub use resume::{PlaythroughSummary, ResumeActive};

use std::sync::Arc;

use whodunit_domain::{PlaythroughId, ScenarioId};

use crate::infrastructure::ports::RepoError;

/// Container for session use cases.
pub struct SessionUseCases {
    pub create: Arc<CreatePlaythrough>,
    pub resume: Arc<ResumeActive>,
    pub authorize: Arc<AuthorizePlaythrough>,
    pub conclude: Arc<ConcludePlaythrough>,
}

impl SessionUseCases {
    pub fn new(
        create: Arc<CreatePlaythrough>,
        resume: Arc<ResumeActive>,
        authorize: Arc<AuthorizePlaythrough>,
        conclude: Arc<ConcludePlaythrough>,
    ) -> Self {
        Self {
            create,
            resume,
            authorize,
            conclude,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(ScenarioId),
    #[error("Playthrough not found: {0}")]
    PlaythroughNotFound(PlaythroughId),
    #[error("Playthrough belongs to another user")]
    Forbidden,
    #[error("No active playthrough")]
    NoActiveSession,
    #[error("Playthrough {0} is already concluded")]
    Concluded(PlaythroughId),
    #[error("Accusation cannot be empty")]
    EmptyAccusation,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use whodunit_domain::{Scenario, ScenarioId};

    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::in_memory::InMemoryStore;
    use crate::infrastructure::ports::ContentRepo;

    pub fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 3, 14, 21, 0, 0)
                .single()
                .expect("valid time"),
        ))
    }

    pub async fn store_with_scenario(budget: u32) -> (Arc<InMemoryStore>, ScenarioId) {
        let store = Arc::new(InMemoryStore::new());
        let scenario = Scenario::new("The Blackwood Affair")
            .expect("valid scenario")
            .with_question_budget(budget);
        store.save_scenario(&scenario).await.expect("save scenario");
        (store, scenario.id)
    }
}
