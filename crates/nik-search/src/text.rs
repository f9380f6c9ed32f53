//! Sentence cleanup, deduplication and keyword ranking.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use nik_core::text::{collapse_whitespace, split_sentences};

use crate::error::SearchError;

static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[(?:\d+|citation needed)\]").unwrap());

/// A candidate sentence with its score and position of first discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSentence {
    pub text: String,
    pub score: u32,
    pub index: usize,
}

/// Weights and markers used by [`score_sentence`].
#[derive(Debug, Clone)]
pub struct Scoring<'a> {
    pub keywords: &'a [String],
    pub era_markers: &'a MarkerSet,
    pub keyword_weight: u32,
    pub era_bonus: u32,
}

/// Strip citation markers such as `[12]` or `[citation needed]` and collapse whitespace.
pub fn clean_text(raw: &str) -> String {
    collapse_whitespace(&CITATION_RE.replace_all(raw, " "))
}

/// Split every body into sentences, keeping the first occurrence of each
/// (compared lowercase) and dropping anything shorter than `min_chars`.
///
/// Each sentence is paired with the index of the body it came from.
pub fn working_sentences<'a, I>(bodies: I, min_chars: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (origin, body) in bodies.into_iter().enumerate() {
        let cleaned = clean_text(body);
        for sentence in split_sentences(&cleaned) {
            if !seen.insert(sentence.to_lowercase()) {
                continue;
            }
            if sentence.chars().count() < min_chars {
                continue;
            }
            out.push((sentence.to_string(), origin));
        }
    }
    out
}

/// Lowercase topic words longer than two characters.
pub fn topic_keywords(topic: &str) -> Vec<String> {
    topic
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// Keyword occurrences times the weight, plus the era bonus once if any
/// era marker appears.
pub fn score_sentence(sentence: &str, scoring: &Scoring<'_>) -> u32 {
    let lower = sentence.to_lowercase();
    let hits: usize = scoring
        .keywords
        .iter()
        .map(|k| lower.matches(k.as_str()).count())
        .sum();
    let mut score = scoring.keyword_weight.saturating_mul(hits as u32);
    if scoring.era_markers.matches(sentence) {
        score = score.saturating_add(scoring.era_bonus);
    }
    score
}

/// Score every sentence and sort by descending score. Ties keep discovery order.
pub fn rank<S: AsRef<str>>(sentences: &[S], scoring: &Scoring<'_>) -> Vec<RankedSentence> {
    let mut ranked: Vec<RankedSentence> = sentences
        .iter()
        .enumerate()
        .map(|(index, s)| RankedSentence {
            text: s.as_ref().to_string(),
            score: score_sentence(s.as_ref(), scoring),
            index,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// A marker list compiled into one case-insensitive word match.
///
/// Markers match whole words. A trailing `*` turns a marker into a stem that
/// matches any word it starts.
#[derive(Debug, Clone)]
pub struct MarkerSet {
    pattern: Option<Regex>,
}

impl MarkerSet {
    pub fn new(markers: &[String]) -> Result<Self, SearchError> {
        let alternatives: Vec<String> = markers.iter().filter_map(|m| marker_pattern(m)).collect();
        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }
        let pattern = Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }
}

fn marker_pattern(marker: &str) -> Option<String> {
    let marker = marker.trim();
    let (word, stem) = match marker.strip_suffix('*') {
        Some(word) => (word.trim_end(), true),
        None => (marker, false),
    };
    if word.is_empty() {
        return None;
    }
    let lead = if word.starts_with(is_word_char) { r"\b" } else { "" };
    let trail = if !stem && word.ends_with(is_word_char) { r"\b" } else { "" };
    Some(format!("{lead}{}{trail}", regex::escape(word)))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(words: &[&str]) -> MarkerSet {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        MarkerSet::new(&words).unwrap()
    }

    fn scoring<'a>(keywords: &'a [String], era: &'a MarkerSet) -> Scoring<'a> {
        Scoring {
            keywords,
            era_markers: era,
            keyword_weight: 2,
            era_bonus: 1,
        }
    }

    #[test]
    fn test_clean_text_strips_citations() {
        assert_eq!(
            clean_text("Sofia is the capital.[3] It is old [citation needed].\n\nVery  old."),
            "Sofia is the capital. It is old . Very old."
        );
        assert_eq!(clean_text("Keep [this] bracket"), "Keep [this] bracket");
    }

    #[test]
    fn test_working_sentences_dedupes_and_filters() {
        let bodies = [
            "Octopuses have three hearts. Short one. They are clever animals.",
            "OCTOPUSES HAVE THREE HEARTS. Octopuses live in every ocean.",
        ];
        let sentences = working_sentences(bodies.iter().copied(), 20);
        assert_eq!(
            sentences,
            vec![
                ("Octopuses have three hearts.".to_string(), 0),
                ("They are clever animals.".to_string(), 0),
                ("Octopuses live in every ocean.".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_topic_keywords() {
        assert_eq!(topic_keywords("History of Bulgaria"), vec!["history", "bulgaria"]);
        assert!(topic_keywords("AI is ok").is_empty());
    }

    #[test]
    fn test_score_counts_occurrences_and_era_bonus() {
        let keywords = topic_keywords("bulgaria");
        let era = markers(&["century", "empire"]);
        let s = scoring(&keywords, &era);
        assert_eq!(score_sentence("Bulgaria borders Romania.", &s), 2);
        assert_eq!(score_sentence("Bulgaria and bulgaria again.", &s), 4);
        assert_eq!(
            score_sentence("The First Bulgarian Empire rose in the 7th century.", &s),
            3
        );
        assert_eq!(score_sentence("Nothing relevant at all.", &s), 0);
    }

    #[test]
    fn test_rank_is_stable_descending() {
        let keywords = topic_keywords("mars");
        let era = markers(&[]);
        let sentences = [
            "A sentence without the word.",
            "Mars is red.",
            "Another plain sentence.",
            "Mars has two moons.",
        ];
        let ranked = rank(&sentences, &scoring(&keywords, &era));
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
        assert_eq!(ranked[0].score, 2);
    }

    #[test]
    fn test_era_markers_match_whole_words() {
        let config = nik_core::config::SearchConfig::default();
        let era = MarkerSet::new(&config.era_markers).unwrap();
        let keywords = topic_keywords("octopus");
        let s = scoring(&keywords, &era);
        assert_eq!(score_sentence("Octopuses have several arms in general.", &s), 2);
        assert_eq!(score_sentence("Octopus literature is a huge operation.", &s), 2);
        assert_eq!(score_sentence("Octopus fossils from the Jurassic era.", &s), 3);
        assert_eq!(score_sentence("Octopus myths spread across centuries.", &s), 3);
    }

    #[test]
    fn test_bucket_markers_ignore_partial_words() {
        let config = nik_core::config::SearchConfig::default();
        let ancient = MarkerSet::new(&config.ancient_markers).unwrap();
        assert!(!ancient.matches("The BBC filmed octopuses in the reef."));
        assert!(!ancient.matches("Romania borders Bulgaria to the north."));
        assert!(ancient.matches("The Roman road crossed the Balkans."));
        assert!(ancient.matches("Founded around 500 BC by Greek settlers."));
        assert!(ancient.matches("Thracian gold was buried with kings."));

        let medieval = MarkerSet::new(&config.medieval_markers).unwrap();
        assert!(medieval.matches("Byzantium lost the region twice."));
        assert!(medieval.matches("The Ottomans arrived in 1393."));

        let modern = MarkerSet::new(&config.modern_markers).unwrap();
        assert!(modern.matches("Bulgaria became independent in 1908."));
        assert!(!modern.matches("Postmodernism reached Sofia late."));
    }

    #[test]
    fn test_empty_marker_set_matches_nothing() {
        let none = markers(&[]);
        assert!(!none.matches("anything at all"));
        let blank = markers(&["  ", "*"]);
        assert!(!blank.matches("anything at all"));
    }
}
