//! Ask an NPC a question.
//!
//! One call makes at most one generation request. The budget is charged only
//! after a reply exists, and the reply is persisted only after the charge
//! succeeds, so a failed generation costs nothing and a lost charge race
//! leaves no orphan reply. The user's message is kept in both cases.

use std::sync::Arc;

use serde::Serialize;
use whodunit_domain::{
    ChatMessage, Npc, NpcId, ObjectProgress, PlaythroughId, Room, ScenarioId, UserId,
};

use super::prompt::{self, DialogueConfig};
use super::DialogueError;
use crate::entities::{ActionBudget, BudgetError, InvestigationTracker, WorldGraph};
use crate::infrastructure::ports::{ChatRepo, ClockPort, LlmPort};
use crate::use_cases::session::{AuthorizePlaythrough, SessionError};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueTurn {
    pub question: ChatMessage,
    pub reply: ChatMessage,
    pub remaining_questions: u32,
    /// Progress of the active investigation after this question, if one is open.
    pub investigation: Option<ObjectProgress>,
}

pub struct SendMessage {
    authorize: Arc<AuthorizePlaythrough>,
    world: Arc<WorldGraph>,
    budget: Arc<ActionBudget>,
    tracker: Arc<InvestigationTracker>,
    chat: Arc<dyn ChatRepo>,
    llm: Arc<dyn LlmPort>,
    clock: Arc<dyn ClockPort>,
    config: DialogueConfig,
}

impl SendMessage {
    pub fn new(
        authorize: Arc<AuthorizePlaythrough>,
        world: Arc<WorldGraph>,
        budget: Arc<ActionBudget>,
        tracker: Arc<InvestigationTracker>,
        chat: Arc<dyn ChatRepo>,
        llm: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
        config: DialogueConfig,
    ) -> Self {
        Self {
            authorize,
            world,
            budget,
            tracker,
            chat,
            llm,
            clock,
            config,
        }
    }

    /// Send `text` to `npc_id`, or to the scenario's default NPC when no id is given.
    pub async fn execute(
        &self,
        user_id: UserId,
        playthrough_id: PlaythroughId,
        npc_id: Option<NpcId>,
        text: &str,
    ) -> Result<DialogueTurn, DialogueError> {
        let playthrough = self.authorize.execute_active(user_id, playthrough_id).await?;

        let text = text.trim();
        if text.is_empty() {
            return Err(DialogueError::EmptyMessage);
        }
        if playthrough.remaining_questions == 0 {
            tracing::warn!(%playthrough_id, "Question rejected, budget exhausted");
            return Err(BudgetError::Exhausted.into());
        }

        let scenario = self.world.scenario(playthrough.scenario_id).await?;
        let (npc, room) = self.resolve_npc(scenario.id, npc_id).await?;

        let prior = self.chat.list(playthrough_id, Some(npc.id)).await?;
        let question = ChatMessage::from_user(playthrough_id, npc.id, text, self.clock.now());
        self.chat.append(&question).await?;

        let request = prompt::build_request(&scenario, &room, &npc, &prior, text, self.config);
        let response = match self.llm.generate(request).await {
            Ok(response) if !response.content.trim().is_empty() => response,
            Ok(_) => {
                tracing::error!(
                    %playthrough_id,
                    npc_id = %npc.id,
                    "Generation returned an empty reply"
                );
                return Err(DialogueError::GenerationUnavailable("empty reply".to_string()));
            }
            Err(e) => {
                tracing::error!(
                    %playthrough_id,
                    npc_id = %npc.id,
                    error = %e,
                    "Generation failed"
                );
                return Err(DialogueError::GenerationUnavailable(e.to_string()));
            }
        };

        // A conclusion that landed during generation surfaces here and keeps the reply out.
        let remaining_questions = match self.budget.charge(playthrough_id).await {
            Ok(remaining) => remaining,
            Err(BudgetError::Concluded(id)) => return Err(SessionError::Concluded(id).into()),
            Err(e) => return Err(e.into()),
        };

        let reply = ChatMessage::from_npc(
            playthrough_id,
            npc.id,
            response.content.trim(),
            self.clock.now(),
        );
        self.chat.append(&reply).await?;

        let investigation = self.tracker.record_question(playthrough_id).await?;

        tracing::info!(
            %playthrough_id,
            npc_id = %npc.id,
            remaining_questions,
            investigating = ?investigation.as_ref().map(|p| p.object_id),
            "NPC answered"
        );

        Ok(DialogueTurn {
            question,
            reply,
            remaining_questions,
            investigation,
        })
    }

    async fn resolve_npc(
        &self,
        scenario_id: ScenarioId,
        npc_id: Option<NpcId>,
    ) -> Result<(Npc, Room), DialogueError> {
        let resolved = match npc_id {
            Some(npc_id) => self.world.npc_in_scenario(npc_id, scenario_id).await?,
            None => self.world.default_npc(scenario_id).await?,
        };
        Ok(resolved)
    }
}
