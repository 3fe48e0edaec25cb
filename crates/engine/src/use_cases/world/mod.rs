//! Exploration use cases: what a player can see and where doors lead.

use std::sync::Arc;

use serde::Serialize;
use whodunit_domain::{InteractiveObject, Npc, ObjectId, Room, RoomId, Scenario, ScenarioId};

use crate::entities::{WorldError, WorldGraph};

/// Container for world use cases.
pub struct WorldUseCases {
    pub explore: Arc<ExploreWorld>,
}

impl WorldUseCases {
    pub fn new(explore: Arc<ExploreWorld>) -> Self {
        Self { explore }
    }
}

/// Player-facing view of a scenario; the background script stays server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub id: ScenarioId,
    pub title: String,
    pub setting: String,
    pub question_budget: u32,
}

impl From<Scenario> for ScenarioSummary {
    fn from(scenario: Scenario) -> Self {
        Self {
            id: scenario.id,
            title: scenario.title,
            setting: scenario.setting,
            question_budget: scenario.question_budget,
        }
    }
}

/// Read-only navigation over scenario content.
pub struct ExploreWorld {
    world: Arc<WorldGraph>,
}

impl ExploreWorld {
    pub fn new(world: Arc<WorldGraph>) -> Self {
        Self { world }
    }

    pub async fn list_scenarios(&self) -> Result<Vec<ScenarioSummary>, WorldError> {
        let scenarios = self.world.list_scenarios().await?;
        Ok(scenarios.into_iter().map(ScenarioSummary::from).collect())
    }

    pub async fn list_rooms(&self, scenario_id: ScenarioId) -> Result<Vec<Room>, WorldError> {
        self.world.list_rooms(scenario_id).await
    }

    pub async fn list_objects(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<InteractiveObject>, WorldError> {
        self.world.list_visible_objects(room_id).await
    }

    pub async fn list_npcs(&self, room_id: RoomId) -> Result<Vec<Npc>, WorldError> {
        self.world.list_npcs(room_id).await
    }

    /// Follow a door to the room behind it.
    pub async fn traverse_door(&self, door_id: ObjectId) -> Result<Room, WorldError> {
        let target = self.world.traverse(door_id).await?;
        self.world.room(target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryStore;
    use crate::infrastructure::ports::ContentRepo;
    use whodunit_domain::{DoorPayload, ObjectPayload, Scenario};

    #[tokio::test]
    async fn traversal_returns_the_target_room() {
        let store = Arc::new(InMemoryStore::new());
        let scenario = Scenario::new("Manor").expect("valid scenario");
        let hall = Room::new(scenario.id, "Hall");
        let library = Room::new(scenario.id, "Library").with_description("Dusty shelves.");
        let door = InteractiveObject::new(
            hall.id,
            "Library door",
            ObjectPayload::Door(DoorPayload {
                target_room_id: library.id,
                requires_key: false,
                key_name: None,
            }),
        );
        store.save_scenario(&scenario).await.expect("save");
        store.save_room(&hall).await.expect("save");
        store.save_room(&library).await.expect("save");
        store.save_object(&door).await.expect("save");

        let explore = ExploreWorld::new(Arc::new(WorldGraph::new(store)));
        let room = explore.traverse_door(door.id).await.expect("open door");
        assert_eq!(room, library);

        assert!(matches!(
            explore.traverse_door(ObjectId::new()).await,
            Err(WorldError::ObjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn scenarios_are_listed_by_title_without_the_script() {
        let store = Arc::new(InMemoryStore::new());
        let manor = Scenario::new("Murder at the Manor")
            .expect("valid scenario")
            .with_background_script("The gardener did it.")
            .with_question_budget(8);
        let affair = Scenario::new("The Blackwood Affair").expect("valid scenario");
        store.save_scenario(&manor).await.expect("save");
        store.save_scenario(&affair).await.expect("save");

        let explore = ExploreWorld::new(Arc::new(WorldGraph::new(store)));
        let scenarios = explore.list_scenarios().await.expect("scenarios");

        let titles: Vec<_> = scenarios.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Murder at the Manor", "The Blackwood Affair"]);
        assert_eq!(scenarios[0].question_budget, 8);
        let json = serde_json::to_value(&scenarios[0]).expect("serialize");
        assert!(json.get("backgroundScript").is_none());
    }
}
