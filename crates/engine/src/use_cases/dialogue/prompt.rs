//! Context assembly for one NPC reply.
//!
//! The request carries a system block (scenario narrative, the NPC's room and
//! persona) followed by that NPC's prior transcript and the new question.
//! Messages exchanged with other NPCs never enter the context.

use whodunit_domain::{Author, ChatMessage, Npc, Room, Scenario};

use crate::infrastructure::ports::{LlmRequest, PromptMessage};

/// Standing instructions placed ahead of the scenario context.
pub const NPC_ROLE_INSTRUCTIONS: &str = r#"You are a character in a murder mystery being questioned by a detective.
Stay in character at all times and answer as the character would, in a few sentences.
Only reveal what your character knows. You may be evasive if your character has reason to be,
but never invent facts that contradict the story below."#;

/// Sampling options applied to every dialogue request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DialogueConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

pub fn build_system_prompt(scenario: &Scenario, room: &Room, npc: &Npc) -> String {
    let mut prompt = String::from(NPC_ROLE_INSTRUCTIONS);

    prompt.push_str(&format!("\n\n## The story: {}\n", scenario.title));
    let narrative = scenario.narrative();
    if !narrative.is_empty() {
        prompt.push_str(&narrative);
        prompt.push('\n');
    }

    prompt.push_str(&format!("\n## Where you are: {}\n", room.name));
    if !room.description.trim().is_empty() {
        prompt.push_str(room.description.trim());
        prompt.push('\n');
    }

    prompt.push_str(&format!("\n## Who you are: {}\n", npc.name));
    if !npc.persona.trim().is_empty() {
        prompt.push_str(npc.persona.trim());
        prompt.push('\n');
    }

    prompt
}

/// `prior` must already be restricted to `npc` and ordered oldest first.
pub fn build_request(
    scenario: &Scenario,
    room: &Room,
    npc: &Npc,
    prior: &[ChatMessage],
    question: &str,
    config: DialogueConfig,
) -> LlmRequest {
    let messages = prior
        .iter()
        .map(|message| match message.author {
            Author::User => PromptMessage::user(message.text.clone()),
            Author::Npc => PromptMessage::assistant(message.text.clone()),
        })
        .chain(std::iter::once(PromptMessage::user(question)))
        .collect();

    LlmRequest::new(messages)
        .with_system_prompt(build_system_prompt(scenario, room, npc))
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MessageRole;
    use chrono::Utc;
    use whodunit_domain::PlaythroughId;

    fn cast() -> (Scenario, Room, Npc) {
        let scenario = Scenario::new("The Blackwood Affair")
            .expect("valid scenario")
            .with_setting("Blackwood Manor, 1926.")
            .with_background_script("Lady Blackwood was poisoned at dinner.");
        let room =
            Room::new(scenario.id, "Kitchen").with_description("Copper pans and a cold stove.");
        let npc =
            Npc::new(room.id, "Mrs. Hale").with_persona("The cook. Nervous, loyal to the family.");
        (scenario, room, npc)
    }

    #[test]
    fn system_prompt_carries_narrative_room_and_persona() {
        let (scenario, room, npc) = cast();
        let prompt = build_system_prompt(&scenario, &room, &npc);

        assert!(prompt.starts_with(NPC_ROLE_INSTRUCTIONS));
        assert!(prompt.contains("Lady Blackwood was poisoned at dinner."));
        assert!(prompt.contains("Copper pans and a cold stove."));
        assert!(prompt.contains("The cook. Nervous, loyal to the family."));
    }

    #[test]
    fn transcript_is_replayed_before_the_new_question() {
        let (scenario, room, npc) = cast();
        let playthrough_id = PlaythroughId::new();
        let now = Utc::now();
        let prior = vec![
            ChatMessage::from_user(playthrough_id, npc.id, "What was served?", now),
            ChatMessage::from_npc(playthrough_id, npc.id, "Tea and seed cake.", now),
        ];

        let request = build_request(
            &scenario,
            &room,
            &npc,
            &prior,
            "Who poured the tea?",
            DialogueConfig {
                temperature: Some(0.7),
                max_tokens: None,
            },
        );

        let roles: Vec<_> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
        );
        assert_eq!(request.messages[2].content, "Who poured the tea?");
        assert_eq!(request.temperature, Some(0.7));
        assert!(request.system_prompt.is_some());
    }
}
