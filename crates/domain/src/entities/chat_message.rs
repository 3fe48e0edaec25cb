//! ChatMessage - one line of a per-NPC transcript.
//!
//! Messages are append-only; the `highlighted` memo flag is the only field
//! that ever changes after creation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ChatMessageId, NpcId, PlaythroughId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Npc,
}

impl Author {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Npc => "npc",
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Author {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "npc" => Ok(Self::Npc),
            other => Err(DomainError::parse(format!("Unknown author: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: ChatMessageId,
    pub playthrough_id: PlaythroughId,
    pub npc_id: NpcId,
    pub author: Author,
    pub text: String,
    pub highlighted: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn from_user(
        playthrough_id: PlaythroughId,
        npc_id: NpcId,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(playthrough_id, npc_id, Author::User, text, now)
    }

    pub fn from_npc(
        playthrough_id: PlaythroughId,
        npc_id: NpcId,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(playthrough_id, npc_id, Author::Npc, text, now)
    }

    fn new(
        playthrough_id: PlaythroughId,
        npc_id: NpcId,
        author: Author,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ChatMessageId::new(),
            playthrough_id,
            npc_id,
            author,
            text: text.into(),
            highlighted: false,
            created_at: now,
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.author == Author::User
    }
}
