//! Topic answers assembled from ranked sentences.

use tracing::{debug, warn};

use nik_core::config::SearchConfig;
use nik_core::types::SearchResult;

use crate::query::{expand_queries, SearchIntent};
use crate::source::{KnowledgeSource, WebSearch};
use crate::error::SearchError;
use crate::text::{rank, topic_keywords, working_sentences, MarkerSet, RankedSentence, Scoring};

const SHORT_SENTENCES: usize = 3;

/// How much to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnswerMode {
    #[default]
    Short,
    Long,
}

/// Gathers, ranks and assembles answers about a topic.
pub struct Synthesizer {
    knowledge: Box<dyn KnowledgeSource>,
    web: Box<dyn WebSearch>,
    config: SearchConfig,
    era: MarkerSet,
    ancient: MarkerSet,
    medieval: MarkerSet,
    modern: MarkerSet,
}

impl Synthesizer {
    pub fn new(
        config: &SearchConfig,
        knowledge: Box<dyn KnowledgeSource>,
        web: Box<dyn WebSearch>,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            knowledge,
            web,
            era: MarkerSet::new(&config.era_markers)?,
            ancient: MarkerSet::new(&config.ancient_markers)?,
            medieval: MarkerSet::new(&config.medieval_markers)?,
            modern: MarkerSet::new(&config.modern_markers)?,
            config: config.clone(),
        })
    }

    /// The string returned when nothing usable was found.
    pub fn not_found(&self) -> &str {
        &self.config.not_found
    }

    /// Answer text for the topic. Never fails; an empty gather yields the
    /// not-found string.
    pub fn synthesize(&self, topic: &str, intent: SearchIntent, mode: AnswerMode) -> String {
        let topic = topic.trim();
        if topic.is_empty() {
            return self.config.not_found.clone();
        }

        let results = self.gather(topic, intent);
        let working = working_sentences(
            results.iter().map(|r| r.body.as_str()),
            self.config.min_sentence_chars,
        );
        if working.is_empty() {
            debug!("No usable sentences for '{}'", topic);
            return self.config.not_found.clone();
        }

        let keywords = topic_keywords(topic);
        let scoring = Scoring {
            keywords: &keywords,
            era_markers: &self.era,
            keyword_weight: self.config.keyword_weight,
            era_bonus: self.config.era_bonus,
        };
        let texts: Vec<&str> = working.iter().map(|(s, _)| s.as_str()).collect();
        let ranked = rank(&texts, &scoring);
        debug!(
            "Ranked {} sentences from {} results for '{}'",
            ranked.len(),
            results.len(),
            topic
        );

        match mode {
            AnswerMode::Short => ranked
                .iter()
                .take(SHORT_SENTENCES)
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            AnswerMode::Long => {
                let used = &ranked[..ranked.len().min(self.config.long_points + 1)];
                let domains = contributing_domains(used, &working, &results);
                self.assemble_long(used, &domains)
            }
        }
    }

    /// Knowledge source once, then the expanded web queries.
    fn gather(&self, topic: &str, intent: SearchIntent) -> Vec<SearchResult> {
        let mut results = Vec::new();
        match self.knowledge.summary(topic) {
            Ok(Some(summary)) => results.push(summary),
            Ok(None) => debug!("Knowledge source has nothing on '{}'", topic),
            Err(e) => warn!("Knowledge source failed for '{}': {}", topic, e),
        }

        let mut web = Vec::new();
        for query in expand_queries(topic, intent)
            .into_iter()
            .take(self.config.max_queries)
        {
            match self.web.search(&query, self.config.max_results_per_query) {
                Ok(found) => web.extend(
                    found
                        .into_iter()
                        .filter(|r| r.body.chars().count() >= self.config.min_body_chars),
                ),
                Err(e) => warn!("Web search failed for '{}': {}", query, e),
            }
        }

        results.extend(self.order_by_trust(web));
        results
    }

    /// Trusted domains first, original order otherwise. Untrusted results
    /// are dropped when `trusted_only` is set.
    fn order_by_trust(&self, results: Vec<SearchResult>) -> Vec<SearchResult> {
        if self.config.trusted_domains.is_empty() {
            return results;
        }
        let (trusted, other): (Vec<_>, Vec<_>) =
            results.into_iter().partition(|r| self.is_trusted(r));
        if self.config.trusted_only {
            return trusted;
        }
        trusted.into_iter().chain(other).collect()
    }

    fn is_trusted(&self, result: &SearchResult) -> bool {
        let Some(domain) = result.domain() else {
            return false;
        };
        self.config.trusted_domains.iter().any(|t| {
            let t = t.to_lowercase();
            domain == t || domain.ends_with(&format!(".{t}"))
        })
    }

    fn assemble_long(&self, used: &[RankedSentence], domains: &[String]) -> String {
        let Some((overview, points)) = used.split_first() else {
            return self.config.not_found.clone();
        };

        let mut ancient = Vec::new();
        let mut medieval = Vec::new();
        let mut modern = Vec::new();
        let mut key_points = Vec::new();
        for point in points {
            let text = point.text.as_str();
            if self.ancient.matches(text) {
                ancient.push(point.text.as_str());
            } else if self.medieval.matches(text) {
                medieval.push(point.text.as_str());
            } else if self.modern.matches(text) {
                modern.push(point.text.as_str());
            } else {
                key_points.push(point.text.as_str());
            }
        }

        let mut out = overview.text.clone();
        for (heading, items) in [
            ("Ancient period", &ancient),
            ("Medieval period", &medieval),
            ("Modern period", &modern),
            ("Key points", &key_points),
        ] {
            push_section(&mut out, heading, items.iter().copied());
        }
        push_section(&mut out, "Sources", domains.iter().map(String::as_str));
        out
    }
}

fn push_section<'a>(out: &mut String, heading: &str, items: impl Iterator<Item = &'a str>) {
    let mut items = items.peekable();
    if items.peek().is_none() {
        return;
    }
    out.push_str(&format!("\n\n{heading}:"));
    for item in items {
        out.push_str("\n- ");
        out.push_str(item);
    }
}

/// Distinct domains of the results that produced the used sentences, in
/// discovery order.
fn contributing_domains(
    used: &[RankedSentence],
    working: &[(String, usize)],
    results: &[SearchResult],
) -> Vec<String> {
    let mut origins: Vec<usize> = used.iter().map(|r| working[r.index].1).collect();
    origins.sort_unstable();
    origins.dedup();

    let mut domains: Vec<String> = Vec::new();
    for origin in origins {
        if let Some(domain) = results.get(origin).and_then(SearchResult::domain) {
            if !domains.contains(&domain) {
                domains.push(domain);
            }
        }
    }
    domains
}
