//! Topic answers synthesized from a knowledge source and web search.
//!
//! Gathers text from unreliable sources, normalizes it into sentences,
//! deduplicates and ranks them by topic keywords, then assembles a short
//! or structured long answer.

pub mod error;
pub mod query;
pub mod source;
pub mod synthesizer;
pub mod text;

pub use error::SearchError;
pub use query::{expand_queries, SearchIntent};
pub use source::{CachedKnowledge, DuckDuckGoSource, KnowledgeSource, WebSearch, WikipediaSource};
pub use synthesizer::{AnswerMode, Synthesizer};
pub use text::{MarkerSet, RankedSentence, Scoring};
