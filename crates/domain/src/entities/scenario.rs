//! Scenario and Ending - the authored root of a case.
//!
//! A scenario owns its rooms (and, through them, objects and NPCs) plus the
//! endings a final accusation is compared against. Scenarios are immutable
//! once authored; the engine only reads them.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{EndingId, ScenarioId};

/// Question budget handed to a new playthrough when the scenario does not set one.
pub const DEFAULT_QUESTION_BUDGET: u32 = 20;

/// An authored investigation case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: ScenarioId,
    pub title: String,
    /// Player-facing setting narrative
    pub setting: String,
    /// Hidden background script the NPCs know about
    pub background_script: String,
    /// Number of dialogue turns a playthrough may spend
    #[serde(default = "default_question_budget")]
    pub question_budget: u32,
}

fn default_question_budget() -> u32 {
    DEFAULT_QUESTION_BUDGET
}

impl Scenario {
    pub fn new(title: impl Into<String>) -> Result<Self, DomainError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(DomainError::validation("Scenario title cannot be empty"));
        }
        Ok(Self {
            id: ScenarioId::new(),
            title,
            setting: String::new(),
            background_script: String::new(),
            question_budget: DEFAULT_QUESTION_BUDGET,
        })
    }

    pub fn with_setting(mut self, setting: impl Into<String>) -> Self {
        self.setting = setting.into();
        self
    }

    pub fn with_background_script(mut self, script: impl Into<String>) -> Self {
        self.background_script = script.into();
        self
    }

    pub fn with_question_budget(mut self, budget: u32) -> Self {
        self.question_budget = budget;
        self
    }

    /// The overall narrative shared with every NPC: setting followed by the
    /// background script, skipping whichever is blank.
    pub fn narrative(&self) -> String {
        [self.setting.trim(), self.background_script.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// One possible resolution of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ending {
    pub id: EndingId,
    pub scenario_id: ScenarioId,
    pub resolution: String,
}

impl Ending {
    pub fn new(scenario_id: ScenarioId, resolution: impl Into<String>) -> Self {
        Self {
            id: EndingId::new(),
            scenario_id,
            resolution: resolution.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scenario_rejects_blank_title() {
        assert!(matches!(
            Scenario::new("   "),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn narrative_joins_setting_and_script() {
        let scenario = Scenario::new("Manor")
            .expect("valid")
            .with_setting("A storm rolls over the manor.")
            .with_background_script("The butler was paid off.");
        assert_eq!(
            scenario.narrative(),
            "A storm rolls over the manor.\n\nThe butler was paid off."
        );
    }

    #[test]
    fn narrative_skips_blank_parts() {
        let scenario = Scenario::new("Manor")
            .expect("valid")
            .with_background_script("Only the script.");
        assert_eq!(scenario.narrative(), "Only the script.");
    }

    #[test]
    fn missing_budget_deserializes_to_default() {
        let json = format!(
            r#"{{"id":"{}","title":"T","setting":"","backgroundScript":""}}"#,
            ScenarioId::new()
        );
        let scenario: Scenario = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(scenario.question_budget, DEFAULT_QUESTION_BUDGET);
    }
}
