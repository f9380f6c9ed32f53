//! N.I.K storage crate - SQLite knowledge cache, JSON memory file, transcripts.
//!
//! The knowledge cache lives in a small SQLite database with versioned
//! migrations. The memory file (user name + recent turns) sits behind the
//! [`MemoryStore`] trait so tests can swap in an in-memory fake.

pub mod db;
pub mod knowledge;
pub mod memory;
pub mod migrations;
pub mod transcript;

pub use db::Database;
pub use knowledge::{KnowledgeCache, KnowledgeEntry};
pub use memory::{InMemoryMemory, JsonFileMemory, MemoryRecord, MemoryStore};
pub use transcript::save_transcript;
