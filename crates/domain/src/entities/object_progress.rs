//! Per-playthrough investigation progress on one object.
//!
//! The tri-state investigation lifecycle is derived from two fields:
//!
//! | state        | `in_investigation` | `remaining_questions` |
//! |--------------|--------------------|-----------------------|
//! | `Unstarted`  | `false`            | `None`                |
//! | `InProgress` | `true`             | `Some(n)`             |
//! | `Completed`  | `false`            | `Some(n)`             |
//!
//! The single-active-investigation rule spans *objects*, so it is enforced by
//! the store, not here.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ObjectId, PlaythroughId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvestigationState {
    Unstarted,
    InProgress,
    Completed,
}

/// Outcome of activating an investigation on a single object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTransition {
    Started,
    AlreadyStarted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectProgress {
    pub playthrough_id: PlaythroughId,
    pub object_id: ObjectId,
    pub remaining_questions: Option<u32>,
    pub in_investigation: bool,
}

impl ObjectProgress {
    pub fn unstarted(playthrough_id: PlaythroughId, object_id: ObjectId) -> Self {
        Self {
            playthrough_id,
            object_id,
            remaining_questions: None,
            in_investigation: false,
        }
    }

    pub fn state(&self) -> InvestigationState {
        match (self.in_investigation, self.remaining_questions) {
            (true, _) => InvestigationState::InProgress,
            (false, None) => InvestigationState::Unstarted,
            (false, Some(_)) => InvestigationState::Completed,
        }
    }

    /// Activate this object. The counter is initialised only the first time,
    /// so re-opening a completed object keeps its progress.
    pub fn start(&mut self, required_questions: u32) -> StartTransition {
        if self.in_investigation {
            return StartTransition::AlreadyStarted;
        }
        self.in_investigation = true;
        if self.remaining_questions.is_none() {
            self.remaining_questions = Some(required_questions);
        }
        StartTransition::Started
    }

    /// Count one qualifying dialogue turn. Floors at zero.
    pub fn record_question(&mut self) -> Result<u32, DomainError> {
        if !self.in_investigation {
            return Err(DomainError::invalid_state_transition(
                "questions can only be recorded against an active investigation",
            ));
        }
        let remaining = self.remaining_questions.unwrap_or(0).saturating_sub(1);
        self.remaining_questions = Some(remaining);
        Ok(remaining)
    }

    pub fn complete(&mut self) -> Result<(), DomainError> {
        if !self.in_investigation {
            return Err(DomainError::invalid_state_transition(
                "investigation is not in progress",
            ));
        }
        self.in_investigation = false;
        Ok(())
    }
}
