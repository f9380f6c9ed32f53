mod cli;
mod commands;
mod session;

use std::sync::Arc;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use nik_chat::{DialogueRouter, LanguageModel, OfflineModel, OllamaModel};
use nik_core::config::NikConfig;
use nik_search::{CachedKnowledge, DuckDuckGoSource, KnowledgeSource, Synthesizer, WikipediaSource};
use nik_storage::{Database, JsonFileMemory, KnowledgeCache};

use cli::{CliArgs, ConfigOrigin};
use session::{Outcome, Session};

const RULE: &str = "============================================================";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Flags are folded in before tracing so --log-level applies.
    let config_file = args.resolve_config_path();
    let (mut config, origin) = cli::load_config(&config_file);
    args.apply(&mut config)?;

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting N.I.K v{}", env!("CARGO_PKG_VERSION"));
    match origin {
        ConfigOrigin::Loaded => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
        }
        ConfigOrigin::Missing => {
            NikConfig::default().save(&config_file)?;
            tracing::info!(path = %config_file.display(), "Default configuration written");
        }
        ConfigOrigin::Invalid(e) => {
            tracing::warn!(
                path = %config_file.display(),
                error = %e,
                "Failed to load config, using defaults"
            );
        }
    }

    // Storage.
    let data_dir = config.data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }

    // Language model.
    let model: Box<dyn LanguageModel> = match config.model.backend.as_str() {
        "offline" => Box::new(OfflineModel),
        "ollama" => Box::new(OllamaModel::new(&config.model)),
        other => {
            tracing::warn!("Unknown model backend '{}', using ollama", other);
            Box::new(OllamaModel::new(&config.model))
        }
    };
    tracing::info!(backend = %config.model.backend, model = %config.model.model, "Language model ready");
    let router = DialogueRouter::new(&config, model)?;

    // Search, optionally backed by the SQLite knowledge cache.
    let wikipedia = WikipediaSource::new(&config.search);
    let (knowledge, stats_cache): (Box<dyn KnowledgeSource>, Option<KnowledgeCache>) =
        if config.storage.cache_knowledge {
            let db_path = data_dir.join(&config.storage.knowledge_db);
            let db = Arc::new(Database::new(&db_path)?);
            tracing::info!(path = %db_path.display(), "Knowledge cache opened");
            (
                Box::new(CachedKnowledge::new(wikipedia, KnowledgeCache::new(Arc::clone(&db)))),
                Some(KnowledgeCache::new(db)),
            )
        } else {
            (Box::new(wikipedia), None)
        };
    let synthesizer = Synthesizer::new(
        &config.search,
        knowledge,
        Box::new(DuckDuckGoSource::new(&config.search)),
    )?;

    // Session.
    let memory = JsonFileMemory::new(data_dir.join(&config.general.memory_file));
    let mut session = Session::new(&config, router, synthesizer, Box::new(memory), data_dir);
    if let Some(cache) = stats_cache {
        session = session.with_knowledge(cache);
    }
    if let Some(ref name) = args.name {
        session.set_user_name(name.as_str());
    }

    print_welcome(&session);
    run_repl(&mut session)
}

fn print_welcome(session: &Session) {
    println!("{RULE}");
    println!("{} - your chill chat buddy", session.bot_name());
    println!("{RULE}");
    println!("{}", commands::HELP);
    println!("{RULE}");
    match session.user_name() {
        Some(name) => println!("Yo {name}, good to see you. Vibe: {}.", session.personality()),
        None => println!("Hey! I'm {}. Set your name with /name.", session.bot_name()),
    }
    println!();
}

fn run_repl(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let mut rl = DefaultEditor::new()?;

    loop {
        let prompt = format!("{}: ", session.user_name().unwrap_or("You"));
        match rl.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                match session.handle_line(&line) {
                    Outcome::Continue(lines) => print_lines(&lines),
                    Outcome::Quit(lines) => {
                        print_lines(&lines);
                        break;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\nChat interrupted.");
                print_lines(&session.farewell());
                break;
            }
            Err(e) => {
                session.farewell();
                return Err(e.into());
            }
        }
    }

    tracing::info!("Session ended");
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
