//! Shared domain types used across the N.I.K crates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NikError;

// =============================================================================
// Conversation turns
// =============================================================================

/// Who said a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Speaker {
    /// The human, with the name they had chosen at the time (if any).
    User { name: Option<String> },
    /// The bot.
    Bot,
}

/// A single line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(name: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User {
                name: name.map(str::to_string),
            },
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            text: text.into(),
        }
    }

    pub fn is_bot(&self) -> bool {
        matches!(self.speaker, Speaker::Bot)
    }

    /// Label used when rendering the turn into a prompt or transcript.
    pub fn label<'a>(&'a self, bot_name: &'a str) -> &'a str {
        match &self.speaker {
            Speaker::User { name: Some(name) } => name.as_str(),
            Speaker::User { name: None } => "User",
            Speaker::Bot => bot_name,
        }
    }

    /// Render as `"<label>: <text>"`.
    pub fn render(&self, bot_name: &str) -> String {
        format!("{}: {}", self.label(bot_name), self.text)
    }
}

// =============================================================================
// Personality
// =============================================================================

/// The bot's active personality profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Friendly,
    Professional,
    #[default]
    Casual,
    Enthusiastic,
}

impl Personality {
    /// All profiles in menu order.
    pub const ALL: [Personality; 4] = [
        Personality::Friendly,
        Personality::Professional,
        Personality::Casual,
        Personality::Enthusiastic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Friendly => "friendly",
            Self::Professional => "professional",
            Self::Casual => "casual",
            Self::Enthusiastic => "enthusiastic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "friendly" => Some(Self::Friendly),
            "professional" => Some(Self::Professional),
            "casual" => Some(Self::Casual),
            "enthusiastic" => Some(Self::Enthusiastic),
            _ => None,
        }
    }

    /// Select by 1-based menu position.
    pub fn from_menu_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Personality {
    type Err = NikError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| NikError::UnknownPersonality(s.to_string()))
    }
}

// =============================================================================
// Search results
// =============================================================================

/// A single record returned by a knowledge or web-search source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub body: String,
    pub url: String,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, body: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            url: url.into(),
        }
    }

    /// Host part of the URL with any `www.` prefix removed.
    ///
    /// Returns `None` when the URL has no host (e.g. an empty string).
    pub fn domain(&self) -> Option<String> {
        let rest = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(self.url.as_str());
        let host = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default()
            .rsplit('@')
            .next()
            .unwrap_or_default();
        let host = host.split(':').next().unwrap_or_default().to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(host.as_str()).to_string();
        if host.is_empty() {
            None
        } else {
            Some(host)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_render_labels() {
        assert_eq!(Turn::user(None, "hey").render("N.I.K"), "User: hey");
        assert_eq!(Turn::user(Some("Sam"), "hey").render("N.I.K"), "Sam: hey");
        assert_eq!(Turn::bot("yo").render("N.I.K"), "N.I.K: yo");
    }

    #[test]
    fn test_turn_serde_roundtrip() {
        let turns = vec![Turn::user(Some("Sam"), "hi"), Turn::bot("hello")];
        let json = serde_json::to_string(&turns).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"role\":\"bot\""));
        let back: Vec<Turn> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, turns);
    }

    #[test]
    fn test_personality_parse_and_display() {
        for p in Personality::ALL {
            assert_eq!(Personality::parse(p.as_str()), Some(p));
            assert_eq!(p.to_string(), p.as_str());
        }
        assert_eq!(Personality::parse("  CASUAL "), Some(Personality::Casual));
        assert_eq!(Personality::parse("grumpy"), None);
        assert!("grumpy".parse::<Personality>().is_err());
    }

    #[test]
    fn test_personality_menu_index() {
        assert_eq!(Personality::from_menu_index(1), Some(Personality::Friendly));
        assert_eq!(Personality::from_menu_index(4), Some(Personality::Enthusiastic));
        assert_eq!(Personality::from_menu_index(0), None);
        assert_eq!(Personality::from_menu_index(5), None);
    }

    #[test]
    fn test_default_personality_is_casual() {
        assert_eq!(Personality::default(), Personality::Casual);
    }

    #[test]
    fn test_search_result_domain() {
        let r = SearchResult::new("t", "b", "https://www.britannica.com/animal/octopus");
        assert_eq!(r.domain().as_deref(), Some("britannica.com"));

        let r = SearchResult::new("t", "b", "http://en.wikipedia.org:443/wiki/X?y=1");
        assert_eq!(r.domain().as_deref(), Some("en.wikipedia.org"));

        let r = SearchResult::new("t", "b", "nasa.gov");
        assert_eq!(r.domain().as_deref(), Some("nasa.gov"));

        let r = SearchResult::new("t", "b", "");
        assert_eq!(r.domain(), None);
    }
}
