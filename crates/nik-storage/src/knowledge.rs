//! Knowledge cache: topic answers remembered between runs.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use nik_core::error::NikError;

use crate::db::Database;

/// A cached piece of knowledge about a topic.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeEntry {
    pub id: Uuid,
    pub topic: String,
    pub content: String,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

/// Repository over the `knowledge` table.
pub struct KnowledgeCache {
    db: Arc<Database>,
}

impl KnowledgeCache {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a new entry. Topics are stored lowercased and trimmed.
    pub fn save(&self, topic: &str, content: &str, source: &str) -> Result<KnowledgeEntry, NikError> {
        let entry = KnowledgeEntry {
            id: Uuid::new_v4(),
            topic: normalize_topic(topic),
            content: content.to_string(),
            source: source.to_string(),
            created_at: Utc::now(),
        };

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO knowledge (id, topic, content, source, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    entry.id.to_string(),
                    entry.topic,
                    entry.content,
                    entry.source,
                    entry.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| NikError::Storage(format!("Failed to save knowledge: {}", e)))?;
            Ok(())
        })?;

        Ok(entry)
    }

    /// Most recent entry stored for exactly this topic.
    pub fn find_topic(&self, topic: &str) -> Result<Option<KnowledgeEntry>, NikError> {
        let topic = normalize_topic(topic);
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, topic, content, source, created_at FROM knowledge
                     WHERE topic = ?1
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT 1",
                )
                .map_err(|e| NikError::Storage(e.to_string()))?;

            let row = stmt
                .query_row(rusqlite::params![topic], |row| Ok(row_to_entry(row)))
                .optional()
                .map_err(|e| NikError::Storage(e.to_string()))?;

            row.transpose()
        })
    }

    /// Entries whose topic or content contains `query`, newest first.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<KnowledgeEntry>, NikError> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(query));

        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, topic, content, source, created_at FROM knowledge
                     WHERE topic LIKE ?1 ESCAPE '\\' OR content LIKE ?1 ESCAPE '\\'
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?2",
                )
                .map_err(|e| NikError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![pattern, limit as i64], |row| {
                    Ok(row_to_entry(row))
                })
                .map_err(|e| NikError::Storage(format!("Knowledge search failed: {}", e)))?;

            let mut entries = Vec::new();
            for row in rows {
                let entry = row.map_err(|e| NikError::Storage(e.to_string()))??;
                entries.push(entry);
            }
            Ok(entries)
        })
    }

    /// Number of cached entries.
    pub fn count(&self) -> Result<u64, NikError> {
        self.db.with_conn(|conn| {
            let n: i64 = conn
                .query_row("SELECT COUNT(*) FROM knowledge", [], |row| row.get(0))
                .map_err(|e| NikError::Storage(e.to_string()))?;
            Ok(n as u64)
        })
    }
}

fn normalize_topic(topic: &str) -> String {
    topic.trim().to_lowercase()
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn row_to_entry(row: &Row<'_>) -> Result<KnowledgeEntry, NikError> {
    let get_err = |e: rusqlite::Error| NikError::Storage(e.to_string());
    let id: String = row.get(0).map_err(get_err)?;
    let created_ms: i64 = row.get(4).map_err(get_err)?;

    Ok(KnowledgeEntry {
        id: Uuid::parse_str(&id).map_err(|e| NikError::Storage(format!("Bad knowledge id: {}", e)))?,
        topic: row.get(1).map_err(get_err)?,
        content: row.get(2).map_err(get_err)?,
        source: row.get(3).map_err(get_err)?,
        created_at: Utc
            .timestamp_millis_opt(created_ms)
            .single()
            .ok_or_else(|| NikError::Storage(format!("Bad timestamp: {}", created_ms)))?,
    })
}
