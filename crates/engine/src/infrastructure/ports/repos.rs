//! Repository port traits for store access.
//!
//! The two race-sensitive operations, [`PlaythroughRepo::charge_question`] and
//! [`InvestigationRepo::try_start`], must be implemented as a single atomic
//! read-modify-write in the store. Callers never read-then-write these fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use whodunit_domain::{
    ChatMessage, ChatMessageId, Ending, InteractiveObject, Npc, NpcId, ObjectId, ObjectProgress,
    Playthrough, PlaythroughId, Room, RoomId, Scenario, ScenarioId, UserId,
};

use super::error::RepoError;
use super::types::{ChargeOutcome, StartOutcome};

// =============================================================================
// Content graph (authored, read-mostly)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepo: Send + Sync {
    // Scenarios
    async fn get_scenario(&self, id: ScenarioId) -> Result<Option<Scenario>, RepoError>;
    async fn list_scenarios(&self) -> Result<Vec<Scenario>, RepoError>;
    async fn save_scenario(&self, scenario: &Scenario) -> Result<(), RepoError>;

    // Rooms
    async fn get_room(&self, id: RoomId) -> Result<Option<Room>, RepoError>;
    /// Rooms of a scenario in authoring order.
    async fn list_rooms(&self, scenario_id: ScenarioId) -> Result<Vec<Room>, RepoError>;
    async fn save_room(&self, room: &Room) -> Result<(), RepoError>;

    // Interactive objects
    async fn get_object(&self, id: ObjectId) -> Result<Option<InteractiveObject>, RepoError>;
    async fn list_objects_in_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<InteractiveObject>, RepoError>;
    async fn save_object(&self, object: &InteractiveObject) -> Result<(), RepoError>;

    // NPCs
    async fn get_npc(&self, id: NpcId) -> Result<Option<Npc>, RepoError>;
    /// NPCs of a room in authoring order.
    async fn list_npcs_in_room(&self, room_id: RoomId) -> Result<Vec<Npc>, RepoError>;
    async fn save_npc(&self, npc: &Npc) -> Result<(), RepoError>;

    // Endings
    async fn list_endings(&self, scenario_id: ScenarioId) -> Result<Vec<Ending>, RepoError>;
    async fn save_ending(&self, ending: &Ending) -> Result<(), RepoError>;
}

// =============================================================================
// Playthroughs
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaythroughRepo: Send + Sync {
    async fn get(&self, id: PlaythroughId) -> Result<Option<Playthrough>, RepoError>;
    async fn create(&self, playthrough: &Playthrough) -> Result<(), RepoError>;
    /// Most recently created `IN_PROGRESS` playthrough of a user.
    async fn find_active_for_user(&self, user_id: UserId)
        -> Result<Option<Playthrough>, RepoError>;

    /// Atomically spend one question. Fails with `NotFound` for an unknown playthrough.
    async fn charge_question(&self, id: PlaythroughId) -> Result<ChargeOutcome, RepoError>;

    /// Atomically move an `IN_PROGRESS` playthrough to `CONCLUDED`.
    /// Returns `false` (and changes nothing) if it was already concluded.
    async fn conclude(
        &self,
        id: PlaythroughId,
        accusation: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, RepoError>;
}

// =============================================================================
// Investigation progress (per playthrough, per object)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvestigationRepo: Send + Sync {
    async fn get_progress(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
    ) -> Result<Option<ObjectProgress>, RepoError>;

    /// The playthrough's single active investigation, if any.
    async fn find_active(
        &self,
        playthrough_id: PlaythroughId,
    ) -> Result<Option<ObjectProgress>, RepoError>;

    /// Atomically activate `object_id` unless another object is active.
    async fn try_start(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
        required_questions: u32,
    ) -> Result<StartOutcome, RepoError>;

    /// Decrement the active investigation's counter (floored at zero).
    /// Returns the updated progress, or `None` if nothing is active.
    async fn record_question(
        &self,
        playthrough_id: PlaythroughId,
    ) -> Result<Option<ObjectProgress>, RepoError>;

    /// Atomically deactivate `object_id` if it is the active investigation.
    /// Returns `None` (and changes nothing) when it is not in progress.
    async fn try_complete(
        &self,
        playthrough_id: PlaythroughId,
        object_id: ObjectId,
    ) -> Result<Option<ObjectProgress>, RepoError>;
}

// =============================================================================
// Transcripts
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepo: Send + Sync {
    async fn append(&self, message: &ChatMessage) -> Result<(), RepoError>;
    async fn get(&self, id: ChatMessageId) -> Result<Option<ChatMessage>, RepoError>;
    /// Messages in creation order, optionally restricted to one NPC.
    async fn list(
        &self,
        playthrough_id: PlaythroughId,
        npc_id: Option<NpcId>,
    ) -> Result<Vec<ChatMessage>, RepoError>;
    /// Highlighted messages across all NPCs, in creation order.
    async fn list_highlighted(
        &self,
        playthrough_id: PlaythroughId,
    ) -> Result<Vec<ChatMessage>, RepoError>;
    async fn set_highlighted(&self, id: ChatMessageId, value: bool) -> Result<(), RepoError>;
}
