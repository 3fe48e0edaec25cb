//! NPC entity - a character the player can interrogate.

use serde::{Deserialize, Serialize};

use crate::ids::{NpcId, RoomId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    pub id: NpcId,
    pub room_id: RoomId,
    pub name: String,
    /// Persona prompt describing voice, knowledge and secrets
    pub persona: String,
    pub portrait_asset: Option<String>,
    /// Authoring order within the room
    #[serde(default)]
    pub order: u32,
}

impl Npc {
    pub fn new(room_id: RoomId, name: impl Into<String>) -> Self {
        Self {
            id: NpcId::new(),
            room_id,
            name: name.into(),
            persona: String::new(),
            portrait_asset: None,
            order: 0,
        }
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn with_portrait(mut self, asset_path: impl Into<String>) -> Self {
        self.portrait_asset = Some(asset_path.into());
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}
