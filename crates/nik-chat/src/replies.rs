//! Canned reply tables and random picks from them.

use rand::rngs::StdRng;
use rand::Rng;

use nik_core::config::RepliesConfig;

use crate::detector::ContentKind;

/// Lowercase, trim, and drop trailing `.`, `!`, `?`, `,` and `~`.
pub fn normalize_utterance(utterance: &str) -> String {
    utterance
        .trim()
        .to_lowercase()
        .trim_end_matches(['.', '!', '?', ',', '~'])
        .trim_end()
        .to_string()
}

/// Read-only view over the configured reply tables.
#[derive(Debug, Clone)]
pub struct ReplyBook {
    config: RepliesConfig,
}

impl ReplyBook {
    pub fn new(config: &RepliesConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Alternatives for an instant-reply key, if the normalized utterance is one.
    ///
    /// An empty table entry counts as no match.
    pub fn instant_alternatives(&self, utterance: &str) -> Option<&[String]> {
        self.config
            .instant
            .get(&normalize_utterance(utterance))
            .map(Vec::as_slice)
            .filter(|alts| !alts.is_empty())
    }

    pub fn calming(&self, about_person: bool) -> &[String] {
        if about_person && !self.config.calming_person.is_empty() {
            &self.config.calming_person
        } else {
            &self.config.calming
        }
    }

    pub fn tips(&self) -> &[String] {
        &self.config.tips
    }

    pub fn sadness(&self) -> &[String] {
        &self.config.sadness
    }

    pub fn feelings(&self) -> &[String] {
        &self.config.feelings
    }

    pub fn content(&self, kind: ContentKind) -> &[String] {
        match kind {
            ContentKind::Joke => &self.config.jokes,
            ContentKind::Fact => &self.config.facts,
            ContentKind::Story => &self.config.stories,
            ContentKind::News => &self.config.news,
        }
    }
}

/// Uniformly random element, or `None` for an empty table.
pub fn pick<'a>(rng: &mut StdRng, options: &'a [String]) -> Option<&'a str> {
    if options.is_empty() {
        return None;
    }
    Some(options[rng.random_range(0..options.len())].as_str())
}
