//! Rule-based intent detection.
//!
//! Keyword lists come from [`DetectorConfig`] and are compiled once into
//! case-insensitive, word-bounded regexes. Classification is a pure
//! function of the utterance.

use regex::Regex;

use nik_core::config::DetectorConfig;

use crate::error::ChatError;

/// What the user asked for, when a request for canned content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Joke,
    Fact,
    Story,
    News,
}

/// Outcome of intent detection, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Anger,
    Sadness,
    FeelingsQuestion,
    ContentRequest(ContentKind),
    None,
}

/// Compiled detector.
#[derive(Debug, Clone)]
pub struct IntentDetector {
    anger: Option<Regex>,
    sadness: Option<Regex>,
    feelings: Option<Regex>,
    content: Vec<(ContentKind, Regex)>,
    person: Option<Regex>,
    relationship: Option<Regex>,
    punctuation_markers: Vec<String>,
    caps_ratio_threshold: f64,
    caps_min_chars: usize,
}

impl IntentDetector {
    pub fn new(config: &DetectorConfig) -> Result<Self, ChatError> {
        let mut content = Vec::new();
        for (kind, words) in [
            (ContentKind::Joke, &config.joke_keywords),
            (ContentKind::Fact, &config.fact_keywords),
            (ContentKind::Story, &config.story_keywords),
            (ContentKind::News, &config.news_keywords),
        ] {
            if let Some(re) = keyword_regex(words)? {
                content.push((kind, re));
            }
        }

        Ok(Self {
            anger: keyword_regex(&config.anger_keywords)?,
            sadness: keyword_regex(&config.sadness_keywords)?,
            feelings: keyword_regex(&config.feelings_phrases)?,
            content,
            person: keyword_regex(&config.person_keywords)?,
            relationship: keyword_regex(&config.relationship_keywords)?,
            punctuation_markers: config
                .punctuation_markers
                .iter()
                .filter(|m| !m.is_empty())
                .cloned()
                .collect(),
            caps_ratio_threshold: config.caps_ratio_threshold,
            caps_min_chars: config.caps_min_chars,
        })
    }

    /// Classify an utterance. The first matching intent in priority order wins.
    pub fn classify(&self, utterance: &str) -> Intent {
        if self.is_angry(utterance) {
            Intent::Anger
        } else if matches(&self.sadness, utterance) {
            Intent::Sadness
        } else if matches(&self.feelings, utterance) {
            Intent::FeelingsQuestion
        } else if let Some((kind, _)) = self.content.iter().find(|(_, re)| re.is_match(utterance)) {
            Intent::ContentRequest(*kind)
        } else {
            Intent::None
        }
    }

    /// True if the utterance mentions another person.
    pub fn is_about_person(&self, utterance: &str) -> bool {
        matches(&self.person, utterance)
    }

    /// True if the utterance mentions a partner, an ex, a crush and the like.
    pub fn mentions_relationship(&self, utterance: &str) -> bool {
        matches(&self.relationship, utterance)
    }

    fn is_angry(&self, utterance: &str) -> bool {
        matches(&self.anger, utterance)
            || self.is_shouting(utterance)
            || self
                .punctuation_markers
                .iter()
                .any(|m| utterance.contains(m.as_str()))
    }

    fn is_shouting(&self, utterance: &str) -> bool {
        let total = utterance.chars().count();
        if total < self.caps_min_chars.max(1) {
            return false;
        }
        let upper = utterance.chars().filter(|c| c.is_uppercase()).count();
        upper as f64 / total as f64 >= self.caps_ratio_threshold
    }
}

fn matches(re: &Option<Regex>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

/// One alternation over all keywords. Word boundaries are added only on
/// edges that are word characters, so keywords like `i'm done` still match.
fn keyword_regex(words: &[String]) -> Result<Option<Regex>, ChatError> {
    let alternatives: Vec<String> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let lead = if starts_with_word_char(w) { r"\b" } else { "" };
            let trail = if ends_with_word_char(w) { r"\b" } else { "" };
            format!("{lead}{}{trail}", regex::escape(w))
        })
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    let pattern = format!("(?i)(?:{})", alternatives.join("|"));
    Ok(Some(Regex::new(&pattern)?))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn starts_with_word_char(w: &str) -> bool {
    w.chars().next().is_some_and(is_word_char)
}

fn ends_with_word_char(w: &str) -> bool {
    w.chars().next_back().is_some_and(is_word_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> IntentDetector {
        IntentDetector::new(&DetectorConfig::default()).unwrap()
    }

    #[test]
    fn test_anger_by_keyword() {
        assert_eq!(detector().classify("this is so annoying"), Intent::Anger);
        assert_eq!(detector().classify("I'm done with this"), Intent::Anger);
    }

    #[test]
    fn test_anger_by_caps_and_punctuation() {
        let d = detector();
        assert_eq!(d.classify("WHY IS THIS BROKEN"), Intent::Anger);
        assert_eq!(d.classify("seriously!!!"), Intent::Anger);
        assert_eq!(d.classify("what??"), Intent::Anger);
        assert_eq!(d.classify("I HATE THIS!!!"), Intent::Anger);
    }

    #[test]
    fn test_short_caps_is_not_shouting() {
        assert_eq!(detector().classify("OK"), Intent::None);
        assert_eq!(detector().classify("NASA"), Intent::None);
    }

    #[test]
    fn test_keywords_respect_word_boundaries() {
        let d = detector();
        // "mad" inside "made", "sad" inside "Sadie", "ex" inside "next"
        assert_eq!(d.classify("I made pasta"), Intent::None);
        assert_eq!(d.classify("Sadie called"), Intent::None);
        assert!(!d.mentions_relationship("what's next"));
        assert!(d.mentions_relationship("my ex texted me"));
    }

    #[test]
    fn test_priority_anger_over_sadness() {
        assert_eq!(detector().classify("I'm sad and angry"), Intent::Anger);
    }

    #[test]
    fn test_priority_sadness_over_feelings() {
        assert_eq!(
            detector().classify("how are you? I feel lonely"),
            Intent::Sadness
        );
    }

    #[test]
    fn test_feelings_question() {
        assert_eq!(detector().classify("hey, how are you"), Intent::FeelingsQuestion);
    }

    #[test]
    fn test_content_requests() {
        let d = detector();
        assert_eq!(
            d.classify("tell me a joke"),
            Intent::ContentRequest(ContentKind::Joke)
        );
        assert_eq!(
            d.classify("give me a fun fact"),
            Intent::ContentRequest(ContentKind::Fact)
        );
        assert_eq!(
            d.classify("tell me a story"),
            Intent::ContentRequest(ContentKind::Story)
        );
        assert_eq!(
            d.classify("any news today"),
            Intent::ContentRequest(ContentKind::News)
        );
    }

    #[test]
    fn test_person_detection() {
        let d = detector();
        assert!(d.is_about_person("my friend lied to me"));
        assert!(d.is_about_person("she never listens"));
        assert!(!d.is_about_person("the weather is bad"));
    }

    #[test]
    fn test_empty_keyword_lists() {
        let config = DetectorConfig {
            anger_keywords: Vec::new(),
            punctuation_markers: Vec::new(),
            caps_ratio_threshold: 2.0,
            ..DetectorConfig::default()
        };
        let d = IntentDetector::new(&config).unwrap();
        assert_eq!(d.classify("I hate this!!!"), Intent::None);
    }
}
