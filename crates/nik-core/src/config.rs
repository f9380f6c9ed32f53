use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{NikError, Result};
use crate::types::Personality;

/// Top-level configuration for N.I.K.
///
/// Loaded from `~/.nik/config.toml` by default. Phrase tables live here too,
/// so every canned reply can be overridden without touching code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NikConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub personalities: PersonalityConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub replies: RepliesConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl NikConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: NikConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| NikError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Data directory with a leading `~` expanded against `$HOME`.
    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.general.data_dir)
    }
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(raw)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory for the memory file, knowledge cache and transcripts.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Name the bot answers to; also the marker used to split model output.
    pub bot_name: String,
    /// Memory file name inside `data_dir`.
    pub memory_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.nik".to_string(),
            log_level: "info".to_string(),
            bot_name: "N.I.K".to_string(),
            memory_file: "memory.json".to_string(),
        }
    }
}

/// Dialogue router settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum number of turns kept in the conversation window.
    pub history_window: usize,
    /// Longest accepted utterance, in characters.
    pub max_message_chars: usize,
    /// Probability of addressing the user by name in a generated reply.
    pub name_mention_rate: f64,
    /// Reply used when the language model fails.
    pub apology: String,
    /// Personality active at start-up.
    pub default_personality: Personality,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: 10,
            max_message_chars: 2000,
            name_mention_rate: 0.25,
            apology: "My bad bro, had a glitch. Try rephrasing that?".to_string(),
            default_personality: Personality::Casual,
        }
    }
}

/// System instruction for each personality profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityConfig {
    pub friendly: String,
    pub professional: String,
    pub casual: String,
    pub enthusiastic: String,
}

impl PersonalityConfig {
    pub fn instruction(&self, personality: Personality) -> &str {
        match personality {
            Personality::Friendly => &self.friendly,
            Personality::Professional => &self.professional,
            Personality::Casual => &self.casual,
            Personality::Enthusiastic => &self.enthusiastic,
        }
    }
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            friendly: "You are N.I.K, a chill, warm, supportive bro. Talk like a real person. \
                       Relaxed, positive, calm, and brief (2-4 sentences). Use light slang \
                       occasionally, never sound robotic."
                .to_string(),
            professional: "You are N.I.K, a calm, concise professional helper. Speak clearly, \
                           politely, and with short logical responses. No slang. Be efficient."
                .to_string(),
            casual: "You are N.I.K, a super chill buddy. Talk casual like a friendly person: \
                     warm, short, and natural. Use mild humor when appropriate, but keep it \
                     genuine."
                .to_string(),
            enthusiastic: "You are N.I.K, energetic and upbeat. Give short, encouraging replies, \
                           hype the user a little, and stay natural."
                .to_string(),
        }
    }
}

/// Keyword lists and thresholds for intent detection.
///
/// Keywords match on word boundaries, case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub anger_keywords: Vec<String>,
    /// Fraction of uppercase characters at which a message reads as shouting.
    pub caps_ratio_threshold: f64,
    /// Messages shorter than this are never judged on caps ratio.
    pub caps_min_chars: usize,
    /// Substrings like `!!!` that signal frustration on their own.
    pub punctuation_markers: Vec<String>,
    pub sadness_keywords: Vec<String>,
    pub feelings_phrases: Vec<String>,
    pub joke_keywords: Vec<String>,
    pub fact_keywords: Vec<String>,
    pub story_keywords: Vec<String>,
    pub news_keywords: Vec<String>,
    /// Words that mark an angry message as being about another person.
    pub person_keywords: Vec<String>,
    /// Words that earn a calming reply an extra relationship tip.
    pub relationship_keywords: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            anger_keywords: strings(&[
                "angry", "mad", "furious", "pissed", "hate", "annoying", "stupid", "idiot",
                "dumb", "frustrating", "annoyed", "irritated", "fed up", "i'm done",
                "can't take", "drives me crazy", "pisses me off", "so frustrated",
            ]),
            caps_ratio_threshold: 0.6,
            caps_min_chars: 6,
            punctuation_markers: strings(&["!!!", "??"]),
            sadness_keywords: strings(&[
                "sad", "depressed", "lonely", "upset", "down", "bad day", "suicidal",
                "suicide",
            ]),
            feelings_phrases: strings(&[
                "how are you", "how do you feel", "how are you feeling", "are you okay",
                "are you happy", "are you sad", "what's your mood", "how's your day",
            ]),
            joke_keywords: strings(&["joke", "jokes", "funny", "make me laugh"]),
            fact_keywords: strings(&["fact", "facts", "tell me something"]),
            story_keywords: strings(&["story", "stories"]),
            news_keywords: strings(&["news", "headlines"]),
            person_keywords: strings(&[
                "boyfriend", "girlfriend", "friend", "partner", "husband", "wife", "crush",
                "they", "he", "she", "guy", "girl",
            ]),
            relationship_keywords: strings(&["boyfriend", "girlfriend", "partner", "ex", "crush"]),
        }
    }
}

/// Canned reply tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepliesConfig {
    /// Normalized utterance -> alternatives picked uniformly at random.
    pub instant: BTreeMap<String, Vec<String>>,
    pub calming: Vec<String>,
    pub calming_person: Vec<String>,
    pub tips: Vec<String>,
    pub sadness: Vec<String>,
    pub feelings: Vec<String>,
    pub jokes: Vec<String>,
    pub facts: Vec<String>,
    pub stories: Vec<String>,
    pub news: Vec<String>,
}

impl Default for RepliesConfig {
    fn default() -> Self {
        let mut instant = BTreeMap::new();
        let greeting = strings(&["Hey. What's good?", "Yo. How you doing?", "Hey hey. Talk to me."]);
        for key in ["hi", "hello", "hey", "yo", "sup"] {
            instant.insert(key.to_string(), greeting.clone());
        }
        let thanks = strings(&["Anytime, bro.", "No problem.", "Got you."]);
        for key in ["thanks", "thank you", "thx"] {
            instant.insert(key.to_string(), thanks.clone());
        }
        let ack = strings(&["Cool.", "Bet.", "Alright, what's next?"]);
        for key in ["ok", "okay", "cool", "nice"] {
            instant.insert(key.to_string(), ack.clone());
        }
        instant.insert("lol".to_string(), strings(&["Haha, right?", "Glad that landed."]));

        Self {
            instant,
            calming: strings(&[
                "Yo, I hear you bro. Take a breath. What's going on?",
                "That sucks, man. Tell me the short version so we can fix it.",
                "Okay, slow down. Tell me what's the main thing bothering you.",
                "I got you. Want to vent or try to solve it now?",
            ]),
            calming_person: strings(&[
                "Hey, breathe for a sec. I got you. What happened exactly?",
                "That's rough. Take a breath and tell me what went down.",
                "I feel you. Cool down a bit and then say what bothered you most.",
                "Damn, that's heavy. Start from the beginning, I'm listening.",
            ]),
            tips: strings(&[
                "Tip: try 'I feel...' instead of 'You always...'. It helps.",
                "Tip: cool off before responding. Give yourself 5 minutes.",
                "Tip: ask yourself what you actually want from this convo.",
                "Tip: writing the issue down can make the next step clearer.",
            ]),
            sadness: strings(&[
                "Damn, I'm sorry you're feeling like that. Wanna tell me more or do you want a few quick tips to feel a bit better?",
                "That's rough. Wanna talk about it or distract yourself?",
            ]),
            feelings: strings(&[
                "I'm chill, bro! Ready to vibe. How about you?",
                "Feeling relaxed and ready to help. You good?",
                "All good here. What's up with you?",
                "Chillin' and listening. Tell me what's on your mind.",
            ]),
            jokes: strings(&[
                "Why don't programmers like nature? Too many bugs.",
                "I tried to be normal once. Worst two minutes of my life.",
                "Debugging is like being a detective in your own crime movie.",
            ]),
            facts: strings(&[
                "Fun fact. Your brain uses about twenty percent of your body's energy.",
                "Octopuses have three hearts. Yeah. Wild.",
                "Your phone is more powerful than the computers from the moon landing.",
            ]),
            stories: strings(&[
                "Once a dev pushed to prod on a Friday. Nobody saw him all weekend. The end.",
                "A robot walked into a bar and asked for a byte. The bartender said it was on the house.",
            ]),
            news: strings(&[
                "I don't track live headlines, but try /search with a topic and I'll dig around.",
            ]),
        }
    }
}

/// Post-processing limits for generated text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub max_sentences: usize,
    pub max_words: usize,
    /// Returned when a non-empty generation leaves nothing usable.
    pub empty_reply: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_sentences: 3,
            max_words: 60,
            empty_reply: "Hmm.".to_string(),
        }
    }
}

/// Language model backend and sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Backend: "ollama" or "offline".
    pub backend: String,
    /// Base URL of the model server.
    pub endpoint: String,
    /// Model name passed to the server.
    pub model: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: "ollama".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            model: "phi3:mini".to_string(),
            max_new_tokens: 120,
            temperature: 0.7,
            top_p: 0.9,
            repetition_penalty: 1.08,
            timeout_secs: 60,
        }
    }
}

/// Search synthesizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wikipedia REST summary endpoint; the topic is appended as a path segment.
    pub knowledge_endpoint: String,
    /// DuckDuckGo instant answer endpoint.
    pub web_endpoint: String,
    /// Number of expanded queries sent to web search.
    pub max_queries: usize,
    pub max_results_per_query: usize,
    /// Web bodies shorter than this are dropped.
    pub min_body_chars: usize,
    /// Sentences shorter than this are treated as noise.
    pub min_sentence_chars: usize,
    /// Score added per keyword occurrence.
    pub keyword_weight: u32,
    /// Score added once if the sentence mentions an era marker.
    pub era_bonus: u32,
    /// Whole words, case-insensitive. A trailing `*` marks a stem, so
    /// `byzant*` matches "Byzantine" but `roman` does not match "Romania".
    pub era_markers: Vec<String>,
    pub ancient_markers: Vec<String>,
    pub medieval_markers: Vec<String>,
    pub modern_markers: Vec<String>,
    /// Sentences listed after the overview in long answers.
    pub long_points: usize,
    pub trusted_domains: Vec<String>,
    /// Drop web results outside `trusted_domains`.
    pub trusted_only: bool,
    pub timeout_secs: u64,
    pub not_found: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            knowledge_endpoint: "https://en.wikipedia.org/api/rest_v1/page/summary".to_string(),
            web_endpoint: "https://api.duckduckgo.com/".to_string(),
            max_queries: 4,
            max_results_per_query: 5,
            min_body_chars: 80,
            min_sentence_chars: 20,
            keyword_weight: 2,
            era_bonus: 1,
            era_markers: strings(&[
                "century", "centuries", "period", "empire*", "independence", "founded",
                "dynasty", "era",
            ]),
            ancient_markers: strings(&["ancient", "roman", "romans", "thrac*", "antiquity", "bc"]),
            medieval_markers: strings(&["medieval", "ottoman*", "byzant*", "middle ages"]),
            modern_markers: strings(&["modern", "independ*", "world war", "20th", "21st"]),
            long_points: 6,
            trusted_domains: strings(&[
                "wikipedia.org",
                "britannica.com",
                "bbc.com",
                "nasa.gov",
                "nationalgeographic.com",
            ]),
            trusted_only: false,
            timeout_secs: 10,
            not_found: "Sorry, I could not find information on that topic.".to_string(),
        }
    }
}

/// Local storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite knowledge cache file name inside `data_dir`.
    pub knowledge_db: String,
    /// Cache knowledge-source answers in SQLite.
    pub cache_knowledge: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            knowledge_db: "knowledge.db".to_string(),
            cache_knowledge: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = NikConfig::default();
        assert_eq!(config.general.bot_name, "N.I.K");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.chat.history_window, 10);
        assert_eq!(config.chat.default_personality, Personality::Casual);
        assert_eq!(config.extractor.max_sentences, 3);
        assert_eq!(config.model.max_new_tokens, 120);
        assert_eq!(config.search.min_sentence_chars, 20);
        assert!(config.replies.instant.contains_key("hello"));
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"

[chat]
history_window = 4
default_personality = "professional"

[replies.instant]
"gm" = ["Morning!"]
"#;
        let file = create_temp_config(content);
        let config = NikConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.bot_name, "N.I.K");
        assert_eq!(config.chat.history_window, 4);
        assert_eq!(config.chat.default_personality, Personality::Professional);
        assert_eq!(config.chat.max_message_chars, 2000);
        assert_eq!(config.replies.instant.len(), 1);
        assert_eq!(config.replies.instant["gm"], vec!["Morning!"]);
        // Untouched tables keep their defaults.
        assert!(!config.replies.jokes.is_empty());
    }

    #[test]
    fn test_load_invalid_personality_fails() {
        let file = create_temp_config("[chat]\ndefault_personality = \"grumpy\"\n");
        assert!(NikConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = NikConfig::load_or_default(Path::new("/nonexistent/nik/config.toml"));
        assert_eq!(config.general.data_dir, "~/.nik");
    }

    #[test]
    fn test_load_or_default_corrupt_file() {
        let file = create_temp_config("this is = = not toml");
        let config = NikConfig::load_or_default(file.path());
        assert_eq!(config.chat.history_window, 10);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = NikConfig::default();
        config.chat.history_window = 7;
        config.search.trusted_only = true;
        config.save(&path).unwrap();

        let reloaded = NikConfig::load(&path).unwrap();
        assert_eq!(reloaded.chat.history_window, 7);
        assert!(reloaded.search.trusted_only);
        assert_eq!(reloaded.replies.instant, config.replies.instant);
        assert_eq!(reloaded.personalities.casual, config.personalities.casual);
    }

    #[test]
    fn test_personality_instruction_lookup() {
        let p = PersonalityConfig::default();
        for key in Personality::ALL {
            assert!(p.instruction(key).contains("N.I.K"));
        }
        assert_ne!(
            p.instruction(Personality::Friendly),
            p.instruction(Personality::Professional)
        );
    }

    #[test]
    fn test_data_dir_expands_home() {
        let mut config = NikConfig::default();
        config.general.data_dir = "/var/lib/nik".to_string();
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/nik"));

        config.general.data_dir = "~/.nik".to_string();
        if std::env::var("HOME").is_ok() {
            assert!(!config.data_dir().starts_with("~"));
        }
    }
}
