//! Investigation use cases: focus questioning on one object at a time.

mod complete;
mod start;
mod status;

pub use complete::{CompleteInvestigation, InvestigationCompleted};
pub use start::{InvestigationStarted, StartInvestigation};
pub use status::{ActiveInvestigation, GetInvestigationStatus};

use std::sync::Arc;

use whodunit_domain::ObjectId;

use crate::entities::WorldError;
use crate::infrastructure::ports::RepoError;
use crate::use_cases::session::SessionError;

/// Container for investigation use cases.
pub struct InvestigationUseCases {
    pub start: Arc<StartInvestigation>,
    pub complete: Arc<CompleteInvestigation>,
    pub status: Arc<GetInvestigationStatus>,
}

impl InvestigationUseCases {
    pub fn new(
        start: Arc<StartInvestigation>,
        complete: Arc<CompleteInvestigation>,
        status: Arc<GetInvestigationStatus>,
    ) -> Self {
        Self {
            start,
            complete,
            status,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvestigationError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    World(#[from] WorldError),
    #[error("Another investigation is in progress: {active_object_id}")]
    Conflict { active_object_id: ObjectId },
    #[error("Object {0} is not under investigation")]
    NotInProgress(ObjectId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
