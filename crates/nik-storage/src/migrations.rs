//! Database schema migrations.

use rusqlite::Connection;
use tracing::info;

use nik_core::error::NikError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), NikError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| NikError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| NikError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: knowledge_cache");
    }

    Ok(())
}

/// Version 1: knowledge cache table.
fn apply_v1(conn: &Connection) -> Result<(), NikError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS knowledge (
            id          TEXT PRIMARY KEY NOT NULL,
            topic       TEXT NOT NULL,
            content     TEXT NOT NULL,
            source      TEXT NOT NULL DEFAULT 'manual',
            created_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_knowledge_topic
            ON knowledge (topic, created_at DESC);

        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'knowledge_cache');
        ",
    )
    .map_err(|e| NikError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
