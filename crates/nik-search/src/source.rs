//! Knowledge and web-search sources.
//!
//! Both clients are blocking `ureq` agents with a request timeout; no retries.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use nik_core::config::SearchConfig;
use nik_core::types::SearchResult;
use nik_storage::KnowledgeCache;

use crate::error::SearchError;

/// Encyclopedia-style summary lookup for a topic.
pub trait KnowledgeSource {
    /// Summary for the topic, or `None` when the source has no page for it.
    fn summary(&self, topic: &str) -> Result<Option<SearchResult>, SearchError>;
}

/// General web search.
pub trait WebSearch {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError>;
}

fn agent(timeout_secs: u64) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

// =============================================================================
// Wikipedia
// =============================================================================

#[derive(Debug, Deserialize)]
struct WikiSummary {
    #[serde(default)]
    title: String,
    #[serde(default)]
    extract: String,
    #[serde(default)]
    content_urls: Option<WikiUrls>,
}

#[derive(Debug, Deserialize)]
struct WikiUrls {
    desktop: WikiPage,
}

#[derive(Debug, Deserialize)]
struct WikiPage {
    page: String,
}

/// Wikipedia REST summary endpoint.
pub struct WikipediaSource {
    agent: ureq::Agent,
    endpoint: String,
}

impl WikipediaSource {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            agent: agent(config.timeout_secs),
            endpoint: config.knowledge_endpoint.trim_end_matches('/').to_string(),
        }
    }
}

impl KnowledgeSource for WikipediaSource {
    fn summary(&self, topic: &str) -> Result<Option<SearchResult>, SearchError> {
        let title = topic.trim().replace(' ', "_");
        if title.is_empty() {
            return Ok(None);
        }
        let url = format!("{}/{}", self.endpoint, title);

        let response = match self.agent.get(&url).call() {
            Ok(r) => r,
            Err(ureq::Error::Status(404, _)) => {
                debug!("No knowledge page for '{}'", topic);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let summary: WikiSummary = response
            .into_json()
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        if summary.extract.trim().is_empty() {
            return Ok(None);
        }
        let page = summary
            .content_urls
            .map(|u| u.desktop.page)
            .unwrap_or_else(|| format!("https://en.wikipedia.org/wiki/{}", title));
        Ok(Some(SearchResult::new(summary.title, summary.extract, page)))
    }
}

// =============================================================================
// DuckDuckGo
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RelatedTopic {
    #[serde(default)]
    text: String,
    #[serde(default, rename = "FirstURL")]
    first_url: String,
}

/// DuckDuckGo instant-answer API.
pub struct DuckDuckGoSource {
    agent: ureq::Agent,
    endpoint: String,
}

impl DuckDuckGoSource {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            agent: agent(config.timeout_secs),
            endpoint: config.web_endpoint.clone(),
        }
    }
}

impl WebSearch for DuckDuckGoSource {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        let answer: InstantAnswer = self
            .agent
            .get(&self.endpoint)
            .query("q", query)
            .query("format", "json")
            .query("no_html", "1")
            .query("skip_disambig", "1")
            .call()?
            .into_json()
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        Ok(instant_answer_results(answer, max_results))
    }
}

fn instant_answer_results(answer: InstantAnswer, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();
    if !answer.abstract_text.trim().is_empty() {
        results.push(SearchResult::new(
            answer.heading.clone(),
            answer.abstract_text,
            answer.abstract_url,
        ));
    }
    results.extend(
        answer
            .related_topics
            .into_iter()
            .filter(|t| !t.text.trim().is_empty())
            .map(|t| SearchResult::new(answer.heading.clone(), t.text, t.first_url)),
    );
    results.truncate(max_results);
    results
}

// =============================================================================
// SQLite-backed cache
// =============================================================================

/// Serves knowledge summaries from the local cache, falling back to the
/// wrapped source and storing what it returns.
pub struct CachedKnowledge<K> {
    inner: K,
    cache: KnowledgeCache,
}

impl<K: KnowledgeSource> CachedKnowledge<K> {
    pub fn new(inner: K, cache: KnowledgeCache) -> Self {
        Self { inner, cache }
    }
}

impl<K: KnowledgeSource> KnowledgeSource for CachedKnowledge<K> {
    fn summary(&self, topic: &str) -> Result<Option<SearchResult>, SearchError> {
        match self.cache.find_topic(topic) {
            Ok(Some(entry)) => {
                debug!("Knowledge cache hit for '{}'", entry.topic);
                return Ok(Some(SearchResult::new(entry.topic, entry.content, entry.source)));
            }
            Ok(None) => {}
            Err(e) => warn!("Knowledge cache lookup failed: {}", e),
        }

        let fetched = self.inner.summary(topic)?;
        if let Some(result) = &fetched {
            match self.cache.save(topic, &result.body, &result.url) {
                Ok(entry) => info!("Cached knowledge for '{}'", entry.topic),
                Err(e) => warn!("Failed to cache knowledge: {}", e),
            }
        }
        Ok(fetched)
    }
}
