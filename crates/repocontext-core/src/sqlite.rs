//! Schema management and connection handling for the relational index
//! (`index.db`). Query-side trait methods live in `sqlite_queries`.

use std::path::Path;

use rusqlite::Connection;

use crate::types::RepoContextError;

pub const SCHEMA_VERSION: i64 = 1;

pub struct SqliteStore {
    pub(crate) conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, RepoContextError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        let store = SqliteStore { conn };
        store.initialize_schema_impl()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self, RepoContextError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", true)?;
        let store = SqliteStore { conn };
        store.initialize_schema_impl()?;
        Ok(store)
    }

    fn initialize_schema_impl(&self) -> Result<(), RepoContextError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS repocontext_meta (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chunks (
                chunk_id   TEXT PRIMARY KEY,
                files      TEXT NOT NULL,
                token_count INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS index_entries (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL,
                kind       TEXT NOT NULL,
                file       TEXT NOT NULL,
                start_line INTEGER NOT NULL,
                end_line   INTEGER NOT NULL,
                chunk_id   TEXT NOT NULL,
                signature  TEXT NOT NULL,
                UNIQUE(name, file, start_line),
                FOREIGN KEY (chunk_id) REFERENCES chunks(chunk_id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_index_entries_name ON index_entries(name);
            CREATE INDEX IF NOT EXISTS idx_index_entries_kind ON index_entries(kind);
            CREATE INDEX IF NOT EXISTS idx_index_entries_file ON index_entries(file);

            CREATE TABLE IF NOT EXISTS call_relations (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                caller      TEXT NOT NULL,
                callee      TEXT NOT NULL,
                file        TEXT NOT NULL,
                line        INTEGER NOT NULL,
                caller_file TEXT NOT NULL,
                UNIQUE(caller, callee, caller_file, line)
            );
            CREATE INDEX IF NOT EXISTS idx_call_relations_caller ON call_relations(caller);
            CREATE INDEX IF NOT EXISTS idx_call_relations_callee ON call_relations(callee);
            "#,
        )?;
        self.conn.execute(
            "INSERT INTO repocontext_meta(key, value) VALUES ('schema_version', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [SCHEMA_VERSION.to_string()],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_initializes_schema() {
        let store = SqliteStore::in_memory().unwrap();
        let version: i64 = store
            .conn
            .query_row(
                "SELECT value FROM repocontext_meta WHERE key = 'schema_version'",
                [],
                |row| row.get::<_, String>(0),
            )
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn reopening_schema_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize_schema_impl().unwrap();
        store.initialize_schema_impl().unwrap();
    }
}
