//! Conversational engine for N.I.K.
//!
//! Routes each utterance through instant replies, rule-based intent
//! detection, and finally a language model whose output is cleaned up
//! by the response extractor. Also hosts the voice turn, which can
//! answer questions through the search synthesizer.

pub mod detector;
pub mod error;
pub mod extract;
pub mod model;
pub mod prompt;
pub mod replies;
pub mod router;
pub mod voice;
pub mod window;

pub use detector::{ContentKind, Intent, IntentDetector};
pub use error::ChatError;
pub use extract::ResponseExtractor;
pub use model::{GenerationParams, LanguageModel, OfflineModel, OllamaModel};
pub use router::{DialogueRouter, Route, RoutedReply};
pub use voice::{SpeechError, SpeechToText, TextToSpeech, VoiceAssistant, VoiceOutcome};
pub use window::ConversationWindow;
