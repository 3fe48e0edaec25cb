//! In-memory store implementing every repository port.
//!
//! All state sits behind one `RwLock`, so each port call is a single critical
//! section and the atomic operations (budget charge, investigation start) are
//! trivially race-free. Used by tests and for running without a database file.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use whodunit_domain::{
    ChatMessage, ChatMessageId, Ending, InteractiveObject, Npc, NpcId, ObjectId, ObjectProgress,
    Playthrough, PlaythroughId, Room, RoomId, Scenario, ScenarioId, StartTransition, UserId,
};

use crate::infrastructure::ports::{
    ChargeOutcome, ChatRepo, ContentRepo, InvestigationRepo, PlaythroughRepo, RepoError,
    StartOutcome,
};

#[derive(Default)]
struct State {
    // Content is kept in insertion order so authoring order breaks ties.
    scenarios: Vec<Scenario>,
    rooms: Vec<Room>,
    objects: Vec<InteractiveObject>,
    npcs: Vec<Npc>,
    endings: Vec<Ending>,

    playthroughs: Vec<Playthrough>,
    progress: HashMap<(PlaythroughId, ObjectId), ObjectProgress>,
    messages: Vec<ChatMessage>,
}

impl State {
    fn playthrough_mut(&mut self, id: PlaythroughId) -> Result<&mut Playthrough, RepoError> {
        self.playthroughs
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RepoError::not_found("Playthrough", id))
    }

    fn active_progress_mut(
        &mut self,
        playthrough_id: PlaythroughId,
    ) -> Option<&mut ObjectProgress> {
        self.progress
            .values_mut()
            .find(|p| p.playthrough_id == playthrough_id && p.in_investigation)
    }
}

fn upsert<T, K: PartialEq>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> K) {
    let id = key(&item);
    match items.iter_mut().find(|existing| key(existing) == id) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

/// Store backed entirely by process memory.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentRepo for InMemoryStore {
    async fn get_scenario(&self, id: ScenarioId) -> Result<Option<Scenario>, RepoError> {
        let state = self.state.read().await;
        Ok(state.scenarios.iter().find(|s| s.id == id).cloned())
    }

    async fn list_scenarios(&self) -> Result<Vec<Scenario>, RepoError> {
        Ok(self.state.read().await.scenarios.clone())
    }

    async fn save_scenario(&self, scenario: &Scenario) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        upsert(&mut state.scenarios, scenario.clone(), |s| s.id);
        Ok(())
    }

    async fn get_room(&self, id: RoomId) -> Result<Option<Room>, RepoError> {
        let state = self.state.read().await;
        Ok(state.rooms.iter().find(|r| r.id == id).cloned())
    }

    async fn list_rooms(&self, scenario_id: ScenarioId) -> Result<Vec<Room>, RepoError> {
        let state = self.state.read().await;
        let mut rooms: Vec<Room> = state
            .rooms
            .iter()
            .filter(|r| r.scenario_id == scenario_id)
            .cloned()
            .collect();
        rooms.sort_by_key(|r| r.order);
        Ok(rooms)
    }

    async fn save_room(&self, room: &Room) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        upsert(&mut state.rooms, room.clone(), |r| r.id);
        Ok(())
    }

    async fn get_object(&self, id: ObjectId) -> Result<Option<InteractiveObject>, RepoError> {
        let state = self.state.read().await;
        Ok(state.objects.iter().find(|o| o.id == id).cloned())
    }

    async fn list_objects_in_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<InteractiveObject>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .objects
            .iter()
            .filter(|o| o.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn save_object(&self, object: &InteractiveObject) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        upsert(&mut state.objects, object.clone(), |o| o.id);
        Ok(())
    }

    async fn get_npc(&self, id: NpcId) -> Result<Option<Npc>, RepoError> {
        let state = self.state.read().await;
        Ok(state.npcs.iter().find(|n| n.id == id).cloned())
    }

    async fn list_npcs_in_room(&self, room_id: RoomId) -> Result<Vec<Npc>, RepoError> {
        let state = self.state.read().await;
        let mut npcs: Vec<Npc> = state
            .npcs
            .iter()
            .filter(|n| n.room_id == room_id)
            .cloned()
            .collect();
        npcs.sort_by_key(|n| n.order);
        Ok(npcs)
    }

    async fn save_npc(&self, npc: &Npc) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        upsert(&mut state.npcs, npc.clone(), |n| n.id);
        Ok(())
    }

    async fn list_endings(&self, scenario_id: ScenarioId) -> Result<Vec<Ending>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .endings
            .iter()
            .filter(|e| e.scenario_id == scenario_id)
            .cloned()
            .collect())
    }

    async fn save_ending(&self, ending: &Ending) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        upsert(&mut state.endings, ending.clone(), |e| e.id);
        Ok(())
    }
}

#[async_trait]
impl PlaythroughRepo for InMemoryStore {
    async fn get(&self, id: PlaythroughId) -> Result<Option<Playthrough>, RepoError> {
        let state = self.state.read().await;
        Ok(state.playthroughs.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, playthrough: &Playthrough) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        if state.playthroughs.iter().any(|p| p.id == playthrough.id) {
            return Err(RepoError::constraint(format!(
                "playthrough {} already exists",
                playthrough.id
            )));
        }
        state.playthroughs.push(playthrough.clone());
        Ok(())
    }

    async fn find_active_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Playthrough>, RepoError> {
        let state = self.state.read().await;
        // max_by_key keeps the last of equal keys, i.e. the latest insert.
        Ok(state
            .playthroughs
            .iter()
            .filter(|p| p.user_id == user_id && p.is_in_progress())
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn charge_question(&self, id: PlaythroughId) -> Result<ChargeOutcome, RepoError> {
        let mut state = self.state.write().await;
        let playthrough = state.playthrough_mut(id)?;
        if !playthrough.is_in_progress() {
            return Ok(ChargeOutcome::Concluded);
        }
        Ok(match playthrough.try_charge() {
            Some(remaining) => ChargeOutcome::Charged(remaining),
            None => ChargeOutcome::Exhausted,
        })
    }

    async fn conclude(
        &self,
        id: PlaythroughId,
        accusation: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        let playthrough = state.playthrough_mut(id)?;
        Ok(playthrough.conclude(accusation, at).is_ok())
    }
}

#[async_trait]
impl InvestigationRepo for InMemoryStore {
    async fn get_progress(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
    ) -> Result<Option<ObjectProgress>, RepoError> {
        let state = self.state.read().await;
        Ok(state.progress.get(&(playthrough_id, object_id)).cloned())
    }

    async fn find_active(
        &self,
        playthrough_id: PlaythroughId,
    ) -> Result<Option<ObjectProgress>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .progress
            .values()
            .find(|p| p.playthrough_id == playthrough_id && p.in_investigation)
            .cloned())
    }

    async fn try_start(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
        required_questions: u32,
    ) -> Result<StartOutcome, RepoError> {
        let mut state = self.state.write().await;

        if let Some(active) = state.active_progress_mut(playthrough_id) {
            if active.object_id != object_id {
                return Ok(StartOutcome::Conflict {
                    active_object_id: active.object_id,
                });
            }
        }

        let progress = state
            .progress
            .entry((playthrough_id, object_id))
            .or_insert_with(|| ObjectProgress::unstarted(playthrough_id, object_id));

        Ok(match progress.start(required_questions) {
            StartTransition::Started => StartOutcome::Started(progress.clone()),
            StartTransition::AlreadyStarted => StartOutcome::AlreadyStarted(progress.clone()),
        })
    }

    async fn record_question(
        &self,
        playthrough_id: PlaythroughId,
    ) -> Result<Option<ObjectProgress>, RepoError> {
        let mut state = self.state.write().await;
        let Some(active) = state.active_progress_mut(playthrough_id) else {
            return Ok(None);
        };
        active
            .record_question()
            .map_err(RepoError::constraint)?;
        Ok(Some(active.clone()))
    }

    async fn try_complete(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
    ) -> Result<Option<ObjectProgress>, RepoError> {
        let mut state = self.state.write().await;
        let Some(progress) = state.progress.get_mut(&(playthrough_id, object_id)) else {
            return Ok(None);
        };
        Ok(progress.complete().ok().map(|_| progress.clone()))
    }
}

#[async_trait]
impl ChatRepo for InMemoryStore {
    async fn append(&self, message: &ChatMessage) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        state.messages.push(message.clone());
        Ok(())
    }

    async fn get(&self, id: ChatMessageId) -> Result<Option<ChatMessage>, RepoError> {
        let state = self.state.read().await;
        Ok(state.messages.iter().find(|m| m.id == id).cloned())
    }

    async fn list(
        &self,
        playthrough_id: PlaythroughId,
        npc_id: Option<NpcId>,
    ) -> Result<Vec<ChatMessage>, RepoError> {
        let state = self.state.read().await;
        let mut messages: Vec<ChatMessage> = state
            .messages
            .iter()
            .filter(|m| m.playthrough_id == playthrough_id)
            .filter(|m| npc_id.map_or(true, |npc| m.npc_id == npc))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps.
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn list_highlighted(
        &self,
        playthrough_id: PlaythroughId,
    ) -> Result<Vec<ChatMessage>, RepoError> {
        let mut messages = ChatRepo::list(self, playthrough_id, None).await?;
        messages.retain(|m| m.highlighted);
        Ok(messages)
    }

    async fn set_highlighted(&self, id: ChatMessageId, value: bool) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let message = state
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| RepoError::not_found("ChatMessage", id))?;
        message.highlighted = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whodunit_domain::{InvestigationState, Playthrough, ScenarioId, UserId};

    #[tokio::test]
    async fn start_conflicts_with_other_active_object() {
        let store = InMemoryStore::new();
        let playthrough_id = PlaythroughId::new();
        let a = ObjectId::new();
        let b = ObjectId::new();

        let first = store.try_start(playthrough_id, a, 3).await.expect("start a");
        assert!(matches!(first, StartOutcome::Started(ref p) if p.remaining_questions == Some(3)));

        let second = store.try_start(playthrough_id, b, 3).await.expect("start b");
        assert_eq!(second, StartOutcome::Conflict { active_object_id: a });
        assert!(store
            .get_progress(playthrough_id, b)
            .await
            .expect("read")
            .is_none());
    }

    #[tokio::test]
    async fn other_playthroughs_do_not_conflict() {
        let store = InMemoryStore::new();
        let object = ObjectId::new();
        store
            .try_start(PlaythroughId::new(), object, 3)
            .await
            .expect("first");
        let other = store
            .try_start(PlaythroughId::new(), object, 3)
            .await
            .expect("second");
        assert!(matches!(other, StartOutcome::Started(_)));
    }

    #[tokio::test]
    async fn complete_only_applies_to_active_object() {
        let store = InMemoryStore::new();
        let playthrough_id = PlaythroughId::new();
        let object = ObjectId::new();

        assert!(store
            .try_complete(playthrough_id, object)
            .await
            .expect("complete")
            .is_none());

        store
            .try_start(playthrough_id, object, 2)
            .await
            .expect("start");
        let done = store
            .try_complete(playthrough_id, object)
            .await
            .expect("complete")
            .expect("was active");
        assert_eq!(done.state(), InvestigationState::Completed);
        assert!(store
            .find_active(playthrough_id)
            .await
            .expect("read")
            .is_none());
    }

    #[tokio::test]
    async fn charge_reports_missing_playthrough() {
        let store = InMemoryStore::new();
        let err = store
            .charge_question(PlaythroughId::new())
            .await
            .expect_err("unknown playthrough");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn charge_after_conclusion_is_refused() {
        let store = InMemoryStore::new();
        let playthrough = Playthrough::new(UserId::new(), ScenarioId::new(), 4, Utc::now());
        store.create(&playthrough).await.expect("create");
        assert!(store
            .conclude(playthrough.id, "The butler", Utc::now())
            .await
            .expect("conclude"));

        let outcome = store.charge_question(playthrough.id).await.expect("charge");
        assert_eq!(outcome, ChargeOutcome::Concluded);
        let stored = PlaythroughRepo::get(&store, playthrough.id)
            .await
            .expect("read")
            .expect("exists");
        assert_eq!(stored.remaining_questions, 4);
    }
}
