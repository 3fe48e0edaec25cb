//! Room entity - a single screen of the scenario graph.
//!
//! Rooms are linked to each other only through door objects; there is no
//! separate edge type.

use serde::{Deserialize, Serialize};

use crate::ids::{RoomId, ScenarioId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub scenario_id: ScenarioId,
    pub name: String,
    pub description: String,
    /// Path to the background image (presentation only)
    pub background_asset: Option<String>,
    /// Authoring order within the scenario
    #[serde(default)]
    pub order: u32,
}

impl Room {
    pub fn new(scenario_id: ScenarioId, name: impl Into<String>) -> Self {
        Self {
            id: RoomId::new(),
            scenario_id,
            name: name.into(),
            description: String::new(),
            background_asset: None,
            order: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_background(mut self, asset_path: impl Into<String>) -> Self {
        self.background_asset = Some(asset_path.into());
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}
