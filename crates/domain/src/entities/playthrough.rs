//! Playthrough - one user's run through one scenario.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{PlaythroughId, ScenarioId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaythroughStatus {
    InProgress,
    Concluded,
}

impl PlaythroughStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Concluded => "CONCLUDED",
        }
    }
}

impl fmt::Display for PlaythroughStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaythroughStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_PROGRESS" => Ok(Self::InProgress),
            "CONCLUDED" => Ok(Self::Concluded),
            other => Err(DomainError::parse(format!(
                "Unknown playthrough status: {}",
                other
            ))),
        }
    }
}

/// # Invariants
///
/// - `remaining_questions` never goes below zero (it is unsigned and only
///   decremented through [`Playthrough::try_charge`] or an equivalent
///   conditional store update).
/// - Once `Concluded`, a playthrough never returns to `InProgress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playthrough {
    pub id: PlaythroughId,
    pub user_id: UserId,
    pub scenario_id: ScenarioId,
    pub status: PlaythroughStatus,
    /// Global action budget, shared by every NPC
    pub remaining_questions: u32,
    /// Final accusation, recorded on conclusion
    pub accusation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub concluded_at: Option<DateTime<Utc>>,
}

impl Playthrough {
    pub fn new(
        user_id: UserId,
        scenario_id: ScenarioId,
        question_budget: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PlaythroughId::new(),
            user_id,
            scenario_id,
            status: PlaythroughStatus::InProgress,
            remaining_questions: question_budget,
            accusation: None,
            created_at: now,
            concluded_at: None,
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == PlaythroughStatus::InProgress
    }

    /// Spend one question. Returns the new remaining count, or `None` when the
    /// budget is already exhausted or the playthrough is concluded (in which
    /// case nothing changes).
    pub fn try_charge(&mut self) -> Option<u32> {
        if !self.is_in_progress() {
            return None;
        }
        let next = self.remaining_questions.checked_sub(1)?;
        self.remaining_questions = next;
        Some(next)
    }

    pub fn conclude(
        &mut self,
        accusation: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.is_in_progress() {
            return Err(DomainError::invalid_state_transition(
                "playthrough already concluded",
            ));
        }
        self.status = PlaythroughStatus::Concluded;
        self.accusation = Some(accusation.into());
        self.concluded_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playthrough(budget: u32) -> Playthrough {
        Playthrough::new(UserId::new(), ScenarioId::new(), budget, Utc::now())
    }

    #[test]
    fn charge_stops_at_zero() {
        let mut p = playthrough(2);
        assert_eq!(p.try_charge(), Some(1));
        assert_eq!(p.try_charge(), Some(0));
        assert_eq!(p.try_charge(), None);
        assert_eq!(p.remaining_questions, 0);
    }

    #[test]
    fn concluded_playthrough_cannot_be_charged() {
        let mut p = playthrough(3);
        p.conclude("The butler", Utc::now()).expect("conclude");
        assert_eq!(p.try_charge(), None);
        assert_eq!(p.remaining_questions, 3);
    }

    #[test]
    fn conclude_is_one_way() {
        let mut p = playthrough(5);
        let now = Utc::now();
        p.conclude("The gardener", now).expect("first conclusion");
        assert_eq!(p.status, PlaythroughStatus::Concluded);
        assert_eq!(p.accusation.as_deref(), Some("The gardener"));
        assert_eq!(p.concluded_at, Some(now));

        assert!(p.conclude("The cook", now).is_err());
        assert_eq!(p.accusation.as_deref(), Some("The gardener"));
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [PlaythroughStatus::InProgress, PlaythroughStatus::Concluded] {
            assert_eq!(status.as_str().parse::<PlaythroughStatus>(), Ok(status));
        }
    }

    #[test]
    fn ownership_check_compares_user() {
        let p = playthrough(1);
        assert!(p.is_owned_by(p.user_id));
        assert!(!p.is_owned_by(UserId::new()));
    }
}
