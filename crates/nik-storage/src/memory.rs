//! Persisted memory: the user's chosen name and the recent conversation.
//!
//! Read-modify-write with no locking; a single process owns the file.
//! A missing or unreadable file loads as an empty record.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use nik_core::error::NikError;
use nik_core::types::Turn;

/// What survives between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub history: Vec<Turn>,
}

impl MemoryRecord {
    /// Keep only the last `max` turns of history.
    pub fn trim_history(&mut self, max: usize) {
        if self.history.len() > max {
            let excess = self.history.len() - max;
            self.history.drain(..excess);
        }
    }
}

/// Load/save strategy for [`MemoryRecord`].
pub trait MemoryStore {
    /// Load the record. Never fails: bad state reads as empty.
    fn load(&self) -> MemoryRecord;

    /// Persist the record, replacing whatever was stored.
    fn save(&self, record: &MemoryRecord) -> Result<(), NikError>;
}

// =============================================================================
// JSON file
// =============================================================================

/// Memory stored as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileMemory {
    path: PathBuf,
}

impl JsonFileMemory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemoryStore for JsonFileMemory {
    fn load(&self) -> MemoryRecord {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                debug!("No memory at {}: {}", self.path.display(), e);
                return MemoryRecord::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(record) => {
                info!("Memory loaded from {}", self.path.display());
                record
            }
            Err(e) => {
                warn!(
                    "Memory file {} is corrupt: {}. Starting fresh.",
                    self.path.display(),
                    e
                );
                MemoryRecord::default()
            }
        }
    }

    fn save(&self, record: &MemoryRecord) -> Result<(), NikError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&self.path, json)?;
        debug!("Memory saved to {}", self.path.display());
        Ok(())
    }
}

// =============================================================================
// In-memory fake
// =============================================================================

/// Memory kept in process, for tests.
#[derive(Debug, Default)]
pub struct InMemoryMemory {
    record: Mutex<MemoryRecord>,
}

impl InMemoryMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: MemoryRecord) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }
}

impl MemoryStore for InMemoryMemory {
    fn load(&self) -> MemoryRecord {
        self.record
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn save(&self, record: &MemoryRecord) -> Result<(), NikError> {
        let mut guard = self
            .record
            .lock()
            .map_err(|e| NikError::Memory(format!("memory lock poisoned: {}", e)))?;
        *guard = record.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryRecord {
        MemoryRecord {
            user_name: Some("Sam".to_string()),
            history: vec![Turn::user(Some("Sam"), "yo"), Turn::bot("Hey. What's good?")],
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileMemory::new(dir.path().join("sub").join("memory.json"));
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
    }

    #[test]
    fn test_json_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileMemory::new(dir.path().join("nope.json"));
        assert_eq!(store.load(), MemoryRecord::default());
    }

    #[test]
    fn test_json_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, "{ this is not json").unwrap();
        let store = JsonFileMemory::new(&path);
        assert_eq!(store.load(), MemoryRecord::default());
    }

    #[test]
    fn test_json_partial_record_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.json");
        std::fs::write(&path, r#"{"user_name": "Ana"}"#).unwrap();
        let record = JsonFileMemory::new(&path).load();
        assert_eq!(record.user_name.as_deref(), Some("Ana"));
        assert!(record.history.is_empty());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileMemory::new(dir.path().join("memory.json"));
        store.save(&sample()).unwrap();
        store.save(&MemoryRecord::default()).unwrap();
        assert_eq!(store.load(), MemoryRecord::default());
    }

    #[test]
    fn test_in_memory_fake() {
        let store = InMemoryMemory::new();
        assert_eq!(store.load(), MemoryRecord::default());
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
        assert_eq!(InMemoryMemory::with_record(sample()).load(), sample());
    }

    #[test]
    fn test_trim_history_keeps_tail() {
        let mut record = MemoryRecord {
            user_name: None,
            history: (0..5).map(|i| Turn::bot(i.to_string())).collect(),
        };
        record.trim_history(2);
        assert_eq!(record.history, vec![Turn::bot("3"), Turn::bot("4")]);
        record.trim_history(10);
        assert_eq!(record.history.len(), 2);
    }
}
