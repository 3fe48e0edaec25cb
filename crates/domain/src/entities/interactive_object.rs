//! InteractiveObject entity - anything clickable inside a room.
//!
//! The kind-specific data lives in [`ObjectPayload`], a tagged union keyed by
//! `kind`, so a door always carries a target room and an NPC marker always
//! points at an NPC. Investigation progress is *not* stored here: it is
//! per-playthrough runtime state, see [`super::ObjectProgress`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{NpcId, ObjectId, RoomId};

/// Questions an object needs before it counts as investigated, unless authored otherwise.
pub const DEFAULT_REQUIRED_QUESTIONS: u32 = 3;

/// Discriminant of [`ObjectPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Npc,
    Door,
    Evidence,
    Clue,
    Item,
    Book,
    Notepad,
    Key,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npc => "npc",
            Self::Door => "door",
            Self::Evidence => "evidence",
            Self::Clue => "clue",
            Self::Item => "item",
            Self::Book => "book",
            Self::Notepad => "notepad",
            Self::Key => "key",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "npc" => Ok(Self::Npc),
            "door" => Ok(Self::Door),
            "evidence" => Ok(Self::Evidence),
            "clue" => Ok(Self::Clue),
            "item" => Ok(Self::Item),
            "book" => Ok(Self::Book),
            "notepad" => Ok(Self::Notepad),
            "key" => Ok(Self::Key),
            other => Err(DomainError::parse(format!("Unknown object kind: {}", other))),
        }
    }
}

/// Door data: where it leads and whether it is locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorPayload {
    pub target_room_id: RoomId,
    #[serde(default)]
    pub requires_key: bool,
    pub key_name: Option<String>,
}

/// Back-reference from a clickable portrait to its NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcPayload {
    pub npc_id: NpcId,
}

/// Text revealed once an evidence-like object has been investigated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailPayload {
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPayload {
    pub key_name: String,
}

/// Kind-specific object data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ObjectPayload {
    Npc(NpcPayload),
    Door(DoorPayload),
    Evidence(DetailPayload),
    Clue(DetailPayload),
    Item(DetailPayload),
    Book(DetailPayload),
    Notepad(DetailPayload),
    Key(KeyPayload),
}

impl ObjectPayload {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Npc(_) => ObjectKind::Npc,
            Self::Door(_) => ObjectKind::Door,
            Self::Evidence(_) => ObjectKind::Evidence,
            Self::Clue(_) => ObjectKind::Clue,
            Self::Item(_) => ObjectKind::Item,
            Self::Book(_) => ObjectKind::Book,
            Self::Notepad(_) => ObjectKind::Notepad,
            Self::Key(_) => ObjectKind::Key,
        }
    }

    /// Detail text for evidence-like kinds, if authored.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Evidence(d)
            | Self::Clue(d)
            | Self::Item(d)
            | Self::Book(d)
            | Self::Notepad(d) => d.detail.as_deref(),
            Self::Npc(_) | Self::Door(_) | Self::Key(_) => None,
        }
    }
}

/// On-screen placement. Opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectPlacement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveObject {
    pub id: ObjectId,
    pub room_id: RoomId,
    pub name: String,
    pub description: String,
    pub payload: ObjectPayload,
    pub placement: Option<ObjectPlacement>,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    #[serde(default = "default_required_questions")]
    pub required_questions: u32,
}

fn default_visible() -> bool {
    true
}

fn default_required_questions() -> u32 {
    DEFAULT_REQUIRED_QUESTIONS
}

impl InteractiveObject {
    pub fn new(room_id: RoomId, name: impl Into<String>, payload: ObjectPayload) -> Self {
        Self {
            id: ObjectId::new(),
            room_id,
            name: name.into(),
            description: String::new(),
            payload,
            placement: None,
            is_visible: true,
            required_questions: DEFAULT_REQUIRED_QUESTIONS,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_placement(mut self, placement: ObjectPlacement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_required_questions(mut self, required: u32) -> Self {
        self.required_questions = required;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }

    pub fn kind(&self) -> ObjectKind {
        self.payload.kind()
    }

    pub fn as_door(&self) -> Option<&DoorPayload> {
        match &self.payload {
            ObjectPayload::Door(door) => Some(door),
            _ => None,
        }
    }

    /// Content revealed when an investigation on this object is completed:
    /// the description, followed by the payload detail when present.
    pub fn detail_content(&self) -> String {
        match self.payload.detail() {
            Some(detail) if !detail.trim().is_empty() => {
                if self.description.trim().is_empty() {
                    detail.to_string()
                } else {
                    format!("{}\n\n{}", self.description, detail)
                }
            }
            _ => self.description.clone(),
        }
    }
}
