//! Question budget queries.

use std::sync::Arc;

use whodunit_domain::{PlaythroughId, UserId};

use crate::entities::{ActionBudget, BudgetError};
use crate::use_cases::session::{AuthorizePlaythrough, SessionError};

#[derive(Debug, thiserror::Error)]
pub enum GetBudgetError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Budget(#[from] BudgetError),
}

/// Remaining questions of a playthrough the caller owns.
pub struct GetBudget {
    authorize: Arc<AuthorizePlaythrough>,
    budget: Arc<ActionBudget>,
}

impl GetBudget {
    pub fn new(authorize: Arc<AuthorizePlaythrough>, budget: Arc<ActionBudget>) -> Self {
        Self { authorize, budget }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        playthrough_id: PlaythroughId,
    ) -> Result<u32, GetBudgetError> {
        self.authorize.execute(user_id, playthrough_id).await?;
        Ok(self.budget.remaining(playthrough_id).await?)
    }
}
