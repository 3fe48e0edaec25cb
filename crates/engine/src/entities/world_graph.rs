//! Scenario content graph: rooms joined by door objects.
//!
//! Read-only view over authored content. Every lookup that takes a scenario
//! checks that the entity actually belongs to it, so ids from another
//! scenario are indistinguishable from unknown ids.

use std::sync::Arc;

use whodunit_domain::{
    InteractiveObject, Npc, NpcId, ObjectId, Room, RoomId, Scenario, ScenarioId,
};

use crate::infrastructure::ports::{ContentRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(ScenarioId),
    #[error("Room not found: {0}")]
    RoomNotFound(RoomId),
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),
    #[error("NPC not found: {0}")]
    NpcNotFound(NpcId),
    #[error("Scenario {0} has no NPCs")]
    NoNpcs(ScenarioId),
    #[error("Door is locked")]
    Locked { key_name: Option<String> },
    #[error("Object {0} is not a door")]
    NotADoor(ObjectId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl WorldError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ScenarioNotFound(_)
                | Self::RoomNotFound(_)
                | Self::ObjectNotFound(_)
                | Self::NpcNotFound(_)
                | Self::NoNpcs(_)
        )
    }
}

pub struct WorldGraph {
    content: Arc<dyn ContentRepo>,
}

impl WorldGraph {
    pub fn new(content: Arc<dyn ContentRepo>) -> Self {
        Self { content }
    }

    pub async fn scenario(&self, scenario_id: ScenarioId) -> Result<Scenario, WorldError> {
        self.content
            .get_scenario(scenario_id)
            .await?
            .ok_or(WorldError::ScenarioNotFound(scenario_id))
    }

    pub async fn room(&self, room_id: RoomId) -> Result<Room, WorldError> {
        self.content
            .get_room(room_id)
            .await?
            .ok_or(WorldError::RoomNotFound(room_id))
    }

    pub async fn object(&self, object_id: ObjectId) -> Result<InteractiveObject, WorldError> {
        self.content
            .get_object(object_id)
            .await?
            .ok_or(WorldError::ObjectNotFound(object_id))
    }

    /// Every authored scenario, by title.
    pub async fn list_scenarios(&self) -> Result<Vec<Scenario>, WorldError> {
        let mut scenarios = self.content.list_scenarios().await?;
        scenarios.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(scenarios)
    }

    /// Rooms in authoring order.
    pub async fn list_rooms(&self, scenario_id: ScenarioId) -> Result<Vec<Room>, WorldError> {
        self.scenario(scenario_id).await?;
        Ok(self.content.list_rooms(scenario_id).await?)
    }

    pub async fn list_visible_objects(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<InteractiveObject>, WorldError> {
        self.room(room_id).await?;
        let objects = self.content.list_objects_in_room(room_id).await?;
        Ok(objects.into_iter().filter(|o| o.is_visible).collect())
    }

    pub async fn list_npcs(&self, room_id: RoomId) -> Result<Vec<Npc>, WorldError> {
        self.room(room_id).await?;
        Ok(self.content.list_npcs_in_room(room_id).await?)
    }

    /// Where a door leads. Keys are not tracked, so any door that declares a
    /// key requirement stays locked.
    pub fn resolve_door(&self, object: &InteractiveObject) -> Result<RoomId, WorldError> {
        let door = object.as_door().ok_or(WorldError::NotADoor(object.id))?;
        if door.requires_key {
            return Err(WorldError::Locked {
                key_name: door.key_name.clone(),
            });
        }
        Ok(door.target_room_id)
    }

    pub async fn traverse(&self, object_id: ObjectId) -> Result<RoomId, WorldError> {
        let object = self.object(object_id).await?;
        match self.resolve_door(&object) {
            Ok(target) => {
                tracing::debug!(door_id = %object_id, target_room_id = %target, "Door traversed");
                Ok(target)
            }
            Err(e) => {
                tracing::warn!(door_id = %object_id, error = %e, "Door traversal rejected");
                Err(e)
            }
        }
    }

    /// Object lookup constrained to a scenario, with its room.
    pub async fn object_in_scenario(
        &self,
        object_id: ObjectId,
        scenario_id: ScenarioId,
    ) -> Result<(InteractiveObject, Room), WorldError> {
        let object = self.object(object_id).await?;
        let room = self
            .content
            .get_room(object.room_id)
            .await?
            .filter(|room| room.scenario_id == scenario_id)
            .ok_or(WorldError::ObjectNotFound(object_id))?;
        Ok((object, room))
    }

    /// NPC lookup constrained to a scenario, with the room they stand in.
    pub async fn npc_in_scenario(
        &self,
        npc_id: NpcId,
        scenario_id: ScenarioId,
    ) -> Result<(Npc, Room), WorldError> {
        let npc = self
            .content
            .get_npc(npc_id)
            .await?
            .ok_or(WorldError::NpcNotFound(npc_id))?;
        let room = self
            .content
            .get_room(npc.room_id)
            .await?
            .filter(|room| room.scenario_id == scenario_id)
            .ok_or(WorldError::NpcNotFound(npc_id))?;
        Ok((npc, room))
    }

    /// Conversation partner for clients that do not name an NPC: the first
    /// NPC of the first room that has one.
    pub async fn default_npc(&self, scenario_id: ScenarioId) -> Result<(Npc, Room), WorldError> {
        for room in self.list_rooms(scenario_id).await? {
            let npcs = self.content.list_npcs_in_room(room.id).await?;
            if let Some(npc) = npcs.into_iter().next() {
                return Ok((npc, room));
            }
        }
        Err(WorldError::NoNpcs(scenario_id))
    }
}
