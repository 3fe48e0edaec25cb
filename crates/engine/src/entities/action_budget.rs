//! Playthrough-global question budget.

use std::sync::Arc;

use whodunit_domain::PlaythroughId;

use crate::infrastructure::ports::{ChargeOutcome, PlaythroughRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("Question budget exhausted")]
    Exhausted,
    #[error("Playthrough not found: {0}")]
    PlaythroughNotFound(PlaythroughId),
    #[error("Playthrough {0} is already concluded")]
    Concluded(PlaythroughId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Remaining-questions counter shared by every NPC in a playthrough.
pub struct ActionBudget {
    playthroughs: Arc<dyn PlaythroughRepo>,
}

impl ActionBudget {
    pub fn new(playthroughs: Arc<dyn PlaythroughRepo>) -> Self {
        Self { playthroughs }
    }

    /// Spend one question. The decrement is a single conditional store operation,
    /// so concurrent callers can never drive the counter below zero.
    pub async fn charge(&self, playthrough_id: PlaythroughId) -> Result<u32, BudgetError> {
        match self.playthroughs.charge_question(playthrough_id).await {
            Ok(ChargeOutcome::Charged(remaining)) => {
                tracing::debug!(%playthrough_id, remaining, "Question charged");
                Ok(remaining)
            }
            Ok(ChargeOutcome::Exhausted) => {
                tracing::warn!(%playthrough_id, "Charge rejected, budget exhausted");
                Err(BudgetError::Exhausted)
            }
            Ok(ChargeOutcome::Concluded) => {
                tracing::warn!(%playthrough_id, "Charge rejected, playthrough concluded");
                Err(BudgetError::Concluded(playthrough_id))
            }
            Err(e) if e.is_not_found() => Err(BudgetError::PlaythroughNotFound(playthrough_id)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remaining(&self, playthrough_id: PlaythroughId) -> Result<u32, BudgetError> {
        self.playthroughs
            .get(playthrough_id)
            .await?
            .map(|p| p.remaining_questions)
            .ok_or(BudgetError::PlaythroughNotFound(playthrough_id))
    }
}
