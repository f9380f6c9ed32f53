//! One interactive chat session: commands, routing, search and memory.
//!
//! The REPL in `main` feeds lines in and prints whatever comes back, so
//! everything here runs without a terminal.

use std::path::PathBuf;

use chrono::Local;
use tracing::{info, warn};

use nik_chat::{ChatError, ConversationWindow, DialogueRouter};
use nik_core::config::NikConfig;
use nik_core::types::Personality;
use nik_search::Synthesizer;
use nik_storage::{save_transcript, KnowledgeCache, MemoryRecord, MemoryStore};

use crate::commands::{Command, HELP};

/// A milestone line is printed every this many exchanges.
const MILESTONE_EVERY: usize = 10;

/// What the REPL should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print these lines and read the next one.
    Continue(Vec<String>),
    /// Print these lines and stop.
    Quit(Vec<String>),
}

pub struct Session {
    router: DialogueRouter,
    synthesizer: Synthesizer,
    memory: Box<dyn MemoryStore>,
    knowledge: Option<KnowledgeCache>,
    window: ConversationWindow,
    personality: Personality,
    user_name: Option<String>,
    log_dir: PathBuf,
    exchanges: usize,
}

impl Session {
    /// Start a session, restoring the remembered name and recent history.
    pub fn new(
        config: &NikConfig,
        router: DialogueRouter,
        synthesizer: Synthesizer,
        memory: Box<dyn MemoryStore>,
        log_dir: PathBuf,
    ) -> Self {
        let record = memory.load();
        let window = ConversationWindow::from_turns(config.chat.history_window, record.history);
        if !window.is_empty() {
            info!("Restored {} turns from memory", window.len());
        }
        Self {
            router,
            synthesizer,
            memory,
            knowledge: None,
            window,
            personality: config.chat.default_personality,
            user_name: record.user_name,
            log_dir,
            exchanges: 0,
        }
    }

    /// Cache used for `/stats`.
    pub fn with_knowledge(mut self, cache: KnowledgeCache) -> Self {
        self.knowledge = Some(cache);
        self
    }

    pub fn set_user_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        let name = name.trim();
        self.user_name = (!name.is_empty()).then(|| name.to_string());
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn bot_name(&self) -> &str {
        self.router.bot_name()
    }

    pub fn window(&self) -> &ConversationWindow {
        &self.window
    }

    /// Handle one prompt line.
    pub fn handle_line(&mut self, line: &str) -> Outcome {
        let line = line.trim();
        if line.is_empty() {
            return Outcome::Continue(Vec::new());
        }
        match Command::parse(line) {
            Ok(Some(command)) => self.run(command),
            Ok(None) => Outcome::Continue(self.chat(line)),
            Err(e) => Outcome::Continue(vec![e.to_string()]),
        }
    }

    /// Save memory and say goodbye.
    pub fn farewell(&mut self) -> Vec<String> {
        self.persist();
        let line = match &self.user_name {
            Some(name) => format!("{}: Peace out, {name}! It was dope chatting with you.", self.bot_name()),
            None => format!("{}: Peace out, bro! It was dope chatting with you.", self.bot_name()),
        };
        vec![line]
    }

    fn chat(&mut self, line: &str) -> Vec<String> {
        let reply = match self.router.route(
            line,
            self.personality,
            self.user_name.as_deref(),
            &mut self.window,
        ) {
            Ok(reply) => reply,
            Err(ChatError::EmptyMessage) => return Vec::new(),
            Err(e) => return vec![e.to_string()],
        };

        self.exchanges += 1;
        let mut lines = vec![format!("{}: {}", self.bot_name(), reply.text)];
        if self.exchanges % MILESTONE_EVERY == 0 {
            lines.push(format!("[{} exchanges! Nice vibes, bro!]", self.exchanges));
        }
        lines
    }

    fn run(&mut self, command: Command) -> Outcome {
        let lines = match command {
            Command::Help => vec![HELP.to_string()],
            Command::Clear => {
                self.window.clear();
                self.persist();
                vec!["Conversation history cleared. Fresh start.".to_string()]
            }
            Command::Stats => self.stats(),
            Command::Vibe(None) => self.vibe_menu(),
            Command::Vibe(Some(personality)) => {
                self.personality = personality;
                info!("Personality set to {}", personality);
                vec![format!("{}'s vibe set to: {}", self.bot_name(), personality)]
            }
            Command::Name(name) => {
                self.set_user_name(name);
                self.persist();
                vec![format!(
                    "Name updated to: {}",
                    self.user_name.as_deref().unwrap_or_default()
                )]
            }
            Command::Save => self.save_log(),
            Command::Search {
                topic,
                intent,
                mode,
            } => {
                info!("Searching '{}' ({:?}, {:?})", topic, intent, mode);
                vec![self.synthesizer.synthesize(&topic, intent, mode)]
            }
            Command::Exit => return Outcome::Quit(self.farewell()),
        };
        Outcome::Continue(lines)
    }

    fn stats(&self) -> Vec<String> {
        let mut lines = vec![
            "Conversation stats:".to_string(),
            format!("  Exchanges this session: {}", self.exchanges),
            format!("  Messages remembered: {}", self.window.len()),
            format!("  Personality: {}", self.personality),
        ];
        if let Some(name) = &self.user_name {
            lines.push(format!("  Your name: {name}"));
        }
        if let Some(cache) = &self.knowledge {
            match cache.count() {
                Ok(n) => lines.push(format!("  Cached topics: {n}")),
                Err(e) => warn!("Knowledge cache count failed: {}", e),
            }
        }
        lines
    }

    fn vibe_menu(&self) -> Vec<String> {
        let mut lines = vec![format!("Choose {}'s vibe with /vibe <number|name>:", self.bot_name())];
        for (i, p) in Personality::ALL.iter().enumerate() {
            let marker = if *p == self.personality { "*" } else { " " };
            lines.push(format!("{marker} {}. {p}", i + 1));
        }
        lines
    }

    fn save_log(&self) -> Vec<String> {
        if self.window.is_empty() {
            return vec!["Nothing to save yet.".to_string()];
        }
        match save_transcript(&self.log_dir, &self.window.to_vec(), self.bot_name(), Local::now()) {
            Ok(path) => vec![format!("Conversation saved to: {}", path.display())],
            Err(e) => {
                warn!("Transcript save failed: {}", e);
                vec![format!("Could not save the conversation: {e}")]
            }
        }
    }

    fn persist(&self) {
        let mut record = MemoryRecord {
            user_name: self.user_name.clone(),
            history: self.window.to_vec(),
        };
        record.trim_history(self.window.capacity());
        if let Err(e) = self.memory.save(&record) {
            warn!("Failed to save memory: {}", e);
        }
    }
}
