//! Prompt assembly for the language model.

use nik_core::config::PersonalityConfig;
use nik_core::types::Personality;

use crate::window::ConversationWindow;

const BEHAVIOUR: &str = "Act like a real person, not an AI. \
                         Keep replies short (2-4 sentences) and natural.\n\
                         Never say you are an AI. Keep the tone consistent with the personality.";

/// Builds the text sent to the model for one generation.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    personalities: PersonalityConfig,
    bot_name: String,
}

impl PromptBuilder {
    pub fn new(personalities: &PersonalityConfig, bot_name: &str) -> Self {
        Self {
            personalities: personalities.clone(),
            bot_name: bot_name.to_string(),
        }
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// Instruction, optional name hint, behaviour rules, the rendered
    /// window, then an open `"<bot>:"` line for the model to continue.
    pub fn build(
        &self,
        personality: Personality,
        user_name: Option<&str>,
        window: &ConversationWindow,
    ) -> String {
        let mut prompt = String::from(self.personalities.instruction(personality));
        prompt.push('\n');
        if let Some(name) = user_name.filter(|n| !n.trim().is_empty()) {
            prompt.push_str(&format!(
                "The user's name is {name}. Use it naturally once in a while.\n"
            ));
        }
        prompt.push_str(BEHAVIOUR);
        prompt.push_str("\n\nConversation so far:\n");
        if !window.is_empty() {
            prompt.push_str(&window.render(&self.bot_name));
            prompt.push('\n');
        }
        prompt.push_str(&self.bot_name);
        prompt.push(':');
        prompt
    }
}
