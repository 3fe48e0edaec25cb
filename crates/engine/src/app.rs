//! Application state and composition.

use std::sync::Arc;

use crate::entities::{ActionBudget, InvestigationTracker, WorldGraph};
use crate::infrastructure::{
    in_memory::InMemoryStore,
    ports::{ChatRepo, ClockPort, ContentRepo, InvestigationRepo, LlmPort, PlaythroughRepo},
    sqlite::SqliteStore,
};
use crate::use_cases::{
    self,
    dialogue::{DialogueConfig, GetHighlightedHistory, GetHistory, SendMessage},
    investigation::{CompleteInvestigation, GetInvestigationStatus, StartInvestigation},
    session::{AuthorizePlaythrough, ConcludePlaythrough, CreatePlaythrough, ResumeActive},
    world::ExploreWorld,
};

/// Main application state.
///
/// Holds the store ports and every use case.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Store ports, injected directly as trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub content: Arc<dyn ContentRepo>,
    pub playthroughs: Arc<dyn PlaythroughRepo>,
    pub investigations: Arc<dyn InvestigationRepo>,
    pub chat: Arc<dyn ChatRepo>,
}

impl Repositories {
    /// Every port served by one in-memory store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            content: store.clone(),
            playthroughs: store.clone(),
            investigations: store.clone(),
            chat: store,
        }
    }
}

impl From<SqliteStore> for Repositories {
    fn from(store: SqliteStore) -> Self {
        Self {
            content: store.content,
            playthroughs: store.playthroughs,
            investigations: store.investigations,
            chat: store.chat,
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub session: use_cases::SessionUseCases,
    pub world: use_cases::WorldUseCases,
    pub budget: Arc<use_cases::GetBudget>,
    pub investigation: use_cases::InvestigationUseCases,
    pub dialogue: use_cases::DialogueUseCases,
    pub highlight: Arc<use_cases::SetHighlight>,
}

impl App {
    pub fn new(
        repositories: Repositories,
        llm: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
        dialogue_config: DialogueConfig,
    ) -> Self {
        let repos = &repositories;

        // Entity modules
        let world = Arc::new(WorldGraph::new(repos.content.clone()));
        let budget = Arc::new(ActionBudget::new(repos.playthroughs.clone()));
        let tracker = Arc::new(InvestigationTracker::new(repos.investigations.clone()));
        let authorize = Arc::new(AuthorizePlaythrough::new(repos.playthroughs.clone()));

        let session = use_cases::SessionUseCases::new(
            Arc::new(CreatePlaythrough::new(
                repos.content.clone(),
                repos.playthroughs.clone(),
                clock.clone(),
            )),
            Arc::new(ResumeActive::new(
                repos.content.clone(),
                repos.playthroughs.clone(),
            )),
            authorize.clone(),
            Arc::new(ConcludePlaythrough::new(
                authorize.clone(),
                repos.content.clone(),
                repos.playthroughs.clone(),
                clock.clone(),
            )),
        );

        let world_use_cases =
            use_cases::WorldUseCases::new(Arc::new(ExploreWorld::new(world.clone())));

        let investigation = use_cases::InvestigationUseCases::new(
            Arc::new(StartInvestigation::new(
                authorize.clone(),
                world.clone(),
                tracker.clone(),
            )),
            Arc::new(CompleteInvestigation::new(
                authorize.clone(),
                world.clone(),
                tracker.clone(),
            )),
            Arc::new(GetInvestigationStatus::new(
                authorize.clone(),
                world.clone(),
                tracker.clone(),
            )),
        );

        let dialogue = use_cases::DialogueUseCases::new(
            Arc::new(SendMessage::new(
                authorize.clone(),
                world,
                budget.clone(),
                tracker,
                repos.chat.clone(),
                llm,
                clock,
                dialogue_config,
            )),
            Arc::new(GetHistory::new(authorize.clone(), repos.chat.clone())),
            Arc::new(GetHighlightedHistory::new(
                authorize.clone(),
                repos.chat.clone(),
            )),
        );

        let use_cases = UseCases {
            session,
            world: world_use_cases,
            budget: Arc::new(use_cases::GetBudget::new(authorize, budget)),
            investigation,
            dialogue,
            highlight: Arc::new(use_cases::SetHighlight::new(
                repos.chat.clone(),
                repos.playthroughs.clone(),
            )),
        };

        Self {
            repositories,
            use_cases,
        }
    }
}
