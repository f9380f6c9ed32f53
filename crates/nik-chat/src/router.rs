//! Dialogue routing.
//!
//! Ordered policy, first match wins: instant reply, rule-based intent,
//! then language-model generation. Model failures are answered with a
//! fixed apology and never reach the caller.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use nik_core::config::NikConfig;
use nik_core::types::{Personality, Turn};

use crate::detector::{Intent, IntentDetector};
use crate::error::ChatError;
use crate::extract::ResponseExtractor;
use crate::model::{GenerationParams, LanguageModel};
use crate::prompt::PromptBuilder;
use crate::replies::{pick, ReplyBook};
use crate::window::ConversationWindow;

/// Which policy step produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Instant,
    Rule(Intent),
    Generated,
    /// The model failed; the reply is the configured apology.
    Fallback,
}

/// A reply and how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedReply {
    pub text: String,
    pub route: Route,
}

/// Picks a reply for each utterance and records both sides in the window.
pub struct DialogueRouter {
    detector: IntentDetector,
    replies: ReplyBook,
    prompts: PromptBuilder,
    extractor: ResponseExtractor,
    model: Box<dyn LanguageModel>,
    params: GenerationParams,
    rng: StdRng,
    max_message_chars: usize,
    name_mention_rate: f64,
    apology: String,
}

impl DialogueRouter {
    pub fn new(config: &NikConfig, model: Box<dyn LanguageModel>) -> Result<Self, ChatError> {
        Self::with_rng(config, model, StdRng::from_os_rng())
    }

    /// Router with a caller-supplied RNG, so replies are reproducible under a seed.
    pub fn with_rng(
        config: &NikConfig,
        model: Box<dyn LanguageModel>,
        rng: StdRng,
    ) -> Result<Self, ChatError> {
        let bot_name = config.general.bot_name.as_str();
        Ok(Self {
            detector: IntentDetector::new(&config.detector)?,
            replies: ReplyBook::new(&config.replies),
            prompts: PromptBuilder::new(&config.personalities, bot_name),
            extractor: ResponseExtractor::new(&config.extractor, bot_name),
            model,
            params: GenerationParams::from(&config.model),
            rng,
            max_message_chars: config.chat.max_message_chars,
            name_mention_rate: config.chat.name_mention_rate.clamp(0.0, 1.0),
            apology: config.chat.apology.clone(),
        })
    }

    pub fn bot_name(&self) -> &str {
        self.prompts.bot_name()
    }

    /// Route one utterance.
    ///
    /// On success the window has grown by the user turn and the bot turn
    /// (subject to its capacity). Rejected input leaves it untouched.
    pub fn route(
        &mut self,
        utterance: &str,
        personality: Personality,
        user_name: Option<&str>,
        window: &mut ConversationWindow,
    ) -> Result<RoutedReply, ChatError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if utterance.chars().count() > self.max_message_chars {
            return Err(ChatError::MessageTooLong(self.max_message_chars));
        }

        window.push(Turn::user(user_name, utterance));

        let reply = match self.canned_reply(utterance) {
            Some(reply) => reply,
            None => self.generate(personality, user_name, window),
        };
        debug!("Routed via {:?}", reply.route);

        window.push(Turn::bot(reply.text.clone()));
        Ok(reply)
    }

    /// True if an instant reply or a detector rule would answer this utterance.
    pub fn rule_matches(&self, utterance: &str) -> bool {
        self.replies.instant_alternatives(utterance).is_some()
            || rule_table(&self.detector, &self.replies, utterance).is_some()
    }

    fn canned_reply(&mut self, utterance: &str) -> Option<RoutedReply> {
        if let Some(alternatives) = self.replies.instant_alternatives(utterance) {
            if let Some(text) = pick(&mut self.rng, alternatives) {
                return Some(RoutedReply {
                    text: text.to_string(),
                    route: Route::Instant,
                });
            }
        }

        let (intent, table) = rule_table(&self.detector, &self.replies, utterance)?;
        let mut text = pick(&mut self.rng, table)?.to_string();
        if intent == Intent::Anger && self.detector.mentions_relationship(utterance) {
            if let Some(tip) = pick(&mut self.rng, self.replies.tips()) {
                text.push(' ');
                text.push_str(tip);
            }
        }
        Some(RoutedReply {
            text,
            route: Route::Rule(intent),
        })
    }

    fn generate(
        &mut self,
        personality: Personality,
        user_name: Option<&str>,
        window: &ConversationWindow,
    ) -> RoutedReply {
        let prompt = self.prompts.build(personality, user_name, window);
        let raw = match self.model.generate(&prompt, &self.params) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Generation failed: {}", e);
                return self.apology();
            }
        };

        let text = self.extractor.extract(&raw, user_name);
        if text.is_empty() {
            warn!("Model returned nothing");
            return self.apology();
        }

        let text = match user_name.filter(|n| !n.trim().is_empty()) {
            Some(name) if self.rng.random_bool(self.name_mention_rate) => {
                mention_name(&text, name.trim())
            }
            _ => text,
        };
        RoutedReply {
            text,
            route: Route::Generated,
        }
    }

    fn apology(&self) -> RoutedReply {
        RoutedReply {
            text: self.apology.clone(),
            route: Route::Fallback,
        }
    }
}

/// Detected intent and its non-empty reply table.
fn rule_table<'a>(
    detector: &IntentDetector,
    replies: &'a ReplyBook,
    utterance: &str,
) -> Option<(Intent, &'a [String])> {
    let intent = detector.classify(utterance);
    let table = match intent {
        Intent::Anger => replies.calming(detector.is_about_person(utterance)),
        Intent::Sadness => replies.sadness(),
        Intent::FeelingsQuestion => replies.feelings(),
        Intent::ContentRequest(kind) => replies.content(kind),
        Intent::None => return None,
    };
    (!table.is_empty()).then_some((intent, table))
}

/// `"Sure thing, Sam."` when the reply ends in a period, else `"Sam, sure thing!"`.
fn mention_name(reply: &str, name: &str) -> String {
    if let Some(body) = reply.strip_suffix('.') {
        return format!("{body}, {name}.");
    }
    let first_word = reply.split_whitespace().next().unwrap_or_default();
    if first_word == "I" || first_word.starts_with("I'") {
        return format!("{name}, {reply}");
    }
    let mut chars = reply.chars();
    match chars.next() {
        Some(first) => format!("{name}, {}{}", first.to_lowercase(), chars.as_str()),
        None => name.to_string(),
    }
}
