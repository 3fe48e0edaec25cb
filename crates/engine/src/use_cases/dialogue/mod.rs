//! Dialogue use cases: questioning NPCs and reading transcripts back.

mod history;
pub mod prompt;
mod send_message;

pub use history::{GetHighlightedHistory, GetHistory};
pub use prompt::DialogueConfig;
pub use send_message::{DialogueTurn, SendMessage};

use std::sync::Arc;

use crate::entities::{BudgetError, WorldError};
use crate::infrastructure::ports::RepoError;
use crate::use_cases::session::SessionError;

/// Container for dialogue use cases.
pub struct DialogueUseCases {
    pub send: Arc<SendMessage>,
    pub history: Arc<GetHistory>,
    pub highlighted: Arc<GetHighlightedHistory>,
}

impl DialogueUseCases {
    pub fn new(
        send: Arc<SendMessage>,
        history: Arc<GetHistory>,
        highlighted: Arc<GetHighlightedHistory>,
    ) -> Self {
        Self {
            send,
            history,
            highlighted,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    World(#[from] WorldError),
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error("Message text cannot be empty")]
    EmptyMessage,
    #[error("NPC reply unavailable: {0}")]
    GenerationUnavailable(String),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
