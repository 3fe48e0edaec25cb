//! Whodunit domain types.
//!
//! Pure data and invariants for the investigation game: the authored scenario
//! graph, playthroughs, per-object investigation progress and NPC transcripts.
//! No I/O lives here.

pub mod entities;
pub mod error;
pub mod ids;

pub use entities::{
    Author, ChatMessage, DetailPayload, DoorPayload, Ending, InteractiveObject,
    InvestigationState, KeyPayload, Npc, NpcPayload, ObjectKind, ObjectPayload, ObjectPlacement,
    ObjectProgress, Playthrough, PlaythroughStatus, Room, Scenario, StartTransition,
    DEFAULT_QUESTION_BUDGET, DEFAULT_REQUIRED_QUESTIONS,
};

pub use error::DomainError;

pub use ids::{
    ChatMessageId, EndingId, NpcId, ObjectId, PlaythroughId, RoomId, ScenarioId, UserId,
};
