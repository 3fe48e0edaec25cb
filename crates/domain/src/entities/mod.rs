//! Domain entities.
//!
//! Scenario, Room, InteractiveObject, Npc and Ending form the authored content
//! graph. Playthrough, ObjectProgress and ChatMessage are the runtime records
//! the engine mutates.

pub mod chat_message;
pub mod interactive_object;
pub mod npc;
pub mod object_progress;
pub mod playthrough;
pub mod room;
pub mod scenario;

pub use chat_message::{Author, ChatMessage};
pub use interactive_object::{
    DetailPayload, DoorPayload, InteractiveObject, KeyPayload, NpcPayload, ObjectKind,
    ObjectPayload, ObjectPlacement, DEFAULT_REQUIRED_QUESTIONS,
};
pub use npc::Npc;
pub use object_progress::{InvestigationState, ObjectProgress, StartTransition};
pub use playthrough::{Playthrough, PlaythroughStatus};
pub use room::Room;
pub use scenario::{Ending, Scenario, DEFAULT_QUESTION_BUDGET};
