//! Slash commands and exit words typed at the prompt.

use nik_core::types::Personality;
use nik_search::{AnswerMode, SearchIntent};

/// Words that end the session when typed on their own.
const EXIT_WORDS: &[&str] = &["exit", "quit", "bye", "goodbye"];

pub const HELP: &str = "\
Commands:
  /help                                 show this list
  /clear                                forget the current conversation
  /stats                                conversation statistics
  /vibe [key|number]                    show or change the personality
  /name <name>                          set what I call you
  /save                                 write the conversation to a chat log
  /search [--long] [--history] <topic>  look a topic up
  /exit                                 leave (also: exit, quit, bye, goodbye)";

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Stats,
    /// `None` shows the menu.
    Vibe(Option<Personality>),
    Name(String),
    Save,
    Search {
        topic: String,
        intent: SearchIntent,
        mode: AnswerMode,
    },
    Exit,
}

/// Malformed command input. The message doubles as a usage hint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type /help for the list.")]
    Unknown(String),
    #[error("Usage: {0}")]
    MissingArgument(&'static str),
    #[error("No vibe called '{0}'. Pick a name or a number from /vibe.")]
    UnknownPersonality(String),
}

impl Command {
    /// Parse a prompt line.
    ///
    /// `Ok(None)` means the line is an ordinary message for the router.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
            return Ok(Some(Command::Exit));
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(None);
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "help" => Command::Help,
            "clear" => Command::Clear,
            "stats" => Command::Stats,
            "save" => Command::Save,
            "exit" | "quit" => Command::Exit,
            "vibe" => Command::Vibe(parse_vibe(arg)?),
            "name" => {
                if arg.is_empty() {
                    return Err(CommandError::MissingArgument("/name <name>"));
                }
                Command::Name(arg.to_string())
            }
            "search" => parse_search(arg)?,
            _ => return Err(CommandError::Unknown(format!("/{name}"))),
        };
        Ok(Some(command))
    }
}

fn parse_vibe(arg: &str) -> Result<Option<Personality>, CommandError> {
    if arg.is_empty() {
        return Ok(None);
    }
    let picked = match arg.parse::<usize>() {
        Ok(index) => Personality::from_menu_index(index),
        Err(_) => Personality::parse(arg),
    };
    picked
        .map(Some)
        .ok_or_else(|| CommandError::UnknownPersonality(arg.to_string()))
}

fn parse_search(arg: &str) -> Result<Command, CommandError> {
    let mut mode = AnswerMode::Short;
    let mut intent = SearchIntent::General;
    let mut words = Vec::new();
    for word in arg.split_whitespace() {
        match word {
            "--long" => mode = AnswerMode::Long,
            "--history" => intent = SearchIntent::History,
            _ => words.push(word),
        }
    }
    if words.is_empty() {
        return Err(CommandError::MissingArgument(
            "/search [--long] [--history] <topic>",
        ));
    }
    Ok(Command::Search {
        topic: words.join(" "),
        intent,
        mode,
    })
}
