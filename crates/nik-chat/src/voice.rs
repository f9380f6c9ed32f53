//! Voice turn: listen, answer through search or the router, speak.
//!
//! Speech engines live behind [`SpeechToText`] and [`TextToSpeech`]; this
//! crate ships no audio backend of its own.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use nik_core::text::collapse_whitespace;
use nik_core::types::{Personality, Turn};
use nik_search::{AnswerMode, SearchIntent, Synthesizer};

use crate::error::ChatError;
use crate::router::DialogueRouter;
use crate::window::ConversationWindow;

static QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:what|who|when|where|why|how|explain|tell me|information|info|define|about)\b",
    )
    .unwrap()
});

static FILLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:what is|who is|tell me|information|explain|info|about)\b").unwrap()
});

/// Errors from speech engines.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// Audio was captured but no words could be made out.
    #[error("could not understand audio")]
    NotUnderstood,
    #[error("audio device error: {0}")]
    Device(String),
}

/// Speech recognizer.
pub trait SpeechToText {
    /// Block until one utterance has been heard and transcribed.
    fn listen(&mut self) -> Result<String, SpeechError>;
}

/// Speech synthesizer.
pub trait TextToSpeech {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;
}

/// Result of one voice turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    Replied {
        heard: String,
        reply: String,
        /// The reply came from the search synthesizer.
        searched: bool,
    },
    NotUnderstood,
}

/// True if the text reads like a request for information.
pub fn needs_search(text: &str) -> bool {
    text.contains('?') || QUESTION_RE.is_match(text)
}

/// Reduce a spoken question to a search topic.
pub fn clean_query(text: &str) -> String {
    let lower = text.to_lowercase().replace(['?', '!'], " ");
    let stripped = FILLER_RE.replace_all(&lower, " ");
    collapse_whitespace(stripped.trim_matches(|c: char| c.is_whitespace() || c == '.'))
}

/// One listen/answer/speak cycle over pluggable speech engines.
pub struct VoiceAssistant<S, T> {
    stt: S,
    tts: T,
    router: DialogueRouter,
    synthesizer: Synthesizer,
    window: ConversationWindow,
    personality: Personality,
    user_name: Option<String>,
}

impl<S: SpeechToText, T: TextToSpeech> VoiceAssistant<S, T> {
    pub fn new(
        stt: S,
        tts: T,
        router: DialogueRouter,
        synthesizer: Synthesizer,
        window: ConversationWindow,
        personality: Personality,
    ) -> Self {
        Self {
            stt,
            tts,
            router,
            synthesizer,
            window,
            personality,
            user_name: None,
        }
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    pub fn window(&self) -> &ConversationWindow {
        &self.window
    }

    /// Listen once, answer, and speak the answer.
    ///
    /// Canned replies win over search; questions go to the synthesizer and
    /// fall back to the router when nothing is found.
    pub fn turn(&mut self) -> Result<VoiceOutcome, ChatError> {
        let heard = match self.stt.listen() {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) | Err(SpeechError::NotUnderstood) => {
                debug!("Nothing understood");
                return Ok(VoiceOutcome::NotUnderstood);
            }
            Err(e) => return Err(ChatError::Voice(e.to_string())),
        };
        info!("Heard: {}", heard);

        let searched = match self.search_answer(&heard) {
            Some(answer) => {
                self.window
                    .push(Turn::user(self.user_name.as_deref(), heard.as_str()));
                self.window.push(Turn::bot(answer.as_str()));
                Some(answer)
            }
            None => None,
        };

        let (reply, searched) = match searched {
            Some(answer) => (answer, true),
            None => {
                let routed = self.router.route(
                    &heard,
                    self.personality,
                    self.user_name.as_deref(),
                    &mut self.window,
                )?;
                (routed.text, false)
            }
        };

        if let Err(e) = self.tts.speak(&reply) {
            warn!("Speech output failed: {}", e);
        }
        Ok(VoiceOutcome::Replied {
            heard,
            reply,
            searched,
        })
    }

    fn search_answer(&self, heard: &str) -> Option<String> {
        if self.router.rule_matches(heard) || !needs_search(heard) {
            return None;
        }
        let topic = clean_query(heard);
        if topic.is_empty() {
            return None;
        }
        debug!("Searching for '{}'", topic);
        let answer = self
            .synthesizer
            .synthesize(&topic, SearchIntent::General, AnswerMode::Short);
        (answer != self.synthesizer.not_found()).then_some(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use nik_core::config::{NikConfig, SearchConfig};
    use nik_core::types::SearchResult;
    use nik_search::{KnowledgeSource, SearchError, WebSearch};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::model::OfflineModel;

    struct ScriptedEars(VecDeque<Result<String, SpeechError>>);

    impl SpeechToText for ScriptedEars {
        fn listen(&mut self) -> Result<String, SpeechError> {
            self.0.pop_front().unwrap_or(Err(SpeechError::NotUnderstood))
        }
    }

    #[derive(Default)]
    struct RecordingMouth(Vec<String>);

    impl TextToSpeech for RecordingMouth {
        fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
            self.0.push(text.to_string());
            Ok(())
        }
    }

    struct OctopusWiki;

    impl KnowledgeSource for OctopusWiki {
        fn summary(&self, topic: &str) -> Result<Option<SearchResult>, SearchError> {
            Ok((topic == "octopus").then(|| {
                SearchResult::new(
                    "Octopus",
                    "Octopuses have three hearts.",
                    "https://en.wikipedia.org/wiki/Octopus",
                )
            }))
        }
    }

    struct NoWeb;

    impl WebSearch for NoWeb {
        fn search(&self, _q: &str, _n: usize) -> Result<Vec<SearchResult>, SearchError> {
            Ok(Vec::new())
        }
    }

    fn assistant(
        script: Vec<Result<String, SpeechError>>,
    ) -> VoiceAssistant<ScriptedEars, RecordingMouth> {
        let config = NikConfig::default();
        let router =
            DialogueRouter::with_rng(&config, Box::new(OfflineModel), StdRng::seed_from_u64(3))
                .unwrap();
        let synthesizer =
            Synthesizer::new(&SearchConfig::default(), Box::new(OctopusWiki), Box::new(NoWeb))
                .unwrap();
        VoiceAssistant::new(
            ScriptedEars(script.into()),
            RecordingMouth::default(),
            router,
            synthesizer,
            ConversationWindow::new(10),
            Personality::Casual,
        )
    }

    #[test]
    fn test_needs_search() {
        assert!(needs_search("what is an octopus"));
        assert!(needs_search("octopus?"));
        assert!(needs_search("Tell me about Mars"));
        assert!(!needs_search("I like pizza"));
        assert!(!needs_search("somewhat tired"));
    }

    #[test]
    fn test_clean_query() {
        assert_eq!(clean_query("What is octopus?"), "octopus");
        assert_eq!(clean_query("Tell me about   the Roman Empire"), "the roman empire");
        assert_eq!(clean_query("explain"), "");
    }

    #[test]
    fn test_question_is_answered_by_search() {
        let mut a = assistant(vec![Ok("What is octopus?".to_string())]);
        let outcome = a.turn().unwrap();
        assert_eq!(
            outcome,
            VoiceOutcome::Replied {
                heard: "What is octopus?".to_string(),
                reply: "Octopuses have three hearts.".to_string(),
                searched: true,
            }
        );
        assert_eq!(a.tts.0, vec!["Octopuses have three hearts."]);
        assert_eq!(a.window().len(), 2);
    }

    #[test]
    fn test_unknown_topic_falls_back_to_router() {
        let mut a = assistant(vec![Ok("who is zorblax".to_string())]);
        match a.turn().unwrap() {
            VoiceOutcome::Replied { searched, .. } => assert!(!searched),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(a.tts.0.len(), 1);
    }

    #[test]
    fn test_rules_win_over_search() {
        let mut a = assistant(vec![Ok("how are you".to_string())]);
        match a.turn().unwrap() {
            VoiceOutcome::Replied { reply, searched, .. } => {
                assert!(!searched);
                assert!(NikConfig::default().replies.feelings.contains(&reply));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_not_understood_is_silent() {
        let mut a = assistant(vec![Err(SpeechError::NotUnderstood), Ok("  ".to_string())]);
        assert_eq!(a.turn().unwrap(), VoiceOutcome::NotUnderstood);
        assert_eq!(a.turn().unwrap(), VoiceOutcome::NotUnderstood);
        assert!(a.tts.0.is_empty());
        assert!(a.window().is_empty());
    }

    #[test]
    fn test_device_error_propagates() {
        let mut a = assistant(vec![Err(SpeechError::Device("mic unplugged".to_string()))]);
        assert!(matches!(a.turn(), Err(ChatError::Voice(_))));
    }
}
