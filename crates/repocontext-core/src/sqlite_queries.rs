use rusqlite::params;

use crate::sqlite::{SqliteStore, SCHEMA_VERSION};
use crate::store::RepoContextStore;
use crate::types::{CallRelation, ChunkRow, IndexEntry, RepoContextError, SymbolKind};

fn row_to_index_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<IndexEntry> {
    let kind_str: String = row.get("kind")?;
    let kind = SymbolKind::from_str(&kind_str).unwrap_or(SymbolKind::Function);
    Ok(IndexEntry {
        name: row.get("name")?,
        kind,
        file: row.get("file")?,
        start_line: row.get::<_, i64>("start_line")? as u32,
        end_line: row.get::<_, i64>("end_line")? as u32,
        chunk_id: row.get("chunk_id")?,
        signature: row.get("signature")?,
    })
}

fn row_to_call_relation(row: &rusqlite::Row<'_>) -> rusqlite::Result<CallRelation> {
    Ok(CallRelation {
        caller: row.get("caller")?,
        callee: row.get("callee")?,
        file: row.get("file")?,
        line: row.get::<_, i64>("line")? as u32,
        caller_file: row.get("caller_file")?,
    })
}

impl RepoContextStore for SqliteStore {
    fn initialize_schema(&self) -> Result<(), RepoContextError> {
        // Idempotent: `open`/`in_memory` already ran this; exposed on the
        // trait so callers can re-run it explicitly (e.g. `repocontext init`).
        self.conn.execute_batch("SELECT 1;")?;
        Ok(())
    }

    fn schema_version(&self) -> Result<i64, RepoContextError> {
        let version: String = self.conn.query_row(
            "SELECT value FROM repocontext_meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        version
            .parse()
            .map_err(|_| RepoContextError::Schema(format!("non-numeric schema_version: {version}")))
    }

    fn upsert_index_entries(&self, entries: &[IndexEntry]) -> Result<(), RepoContextError> {
        for entry in entries {
            self.conn.execute(
                "INSERT INTO index_entries (name, kind, file, start_line, end_line, chunk_id, signature)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(name, file, start_line) DO UPDATE SET
                     kind = excluded.kind,
                     end_line = excluded.end_line,
                     chunk_id = excluded.chunk_id,
                     signature = excluded.signature",
                params![
                    entry.name,
                    entry.kind.as_str(),
                    entry.file,
                    entry.start_line,
                    entry.end_line,
                    entry.chunk_id,
                    entry.signature,
                ],
            )?;
        }
        Ok(())
    }

    fn upsert_call_relations(&self, relations: &[CallRelation]) -> Result<(), RepoContextError> {
        for rel in relations {
            self.conn.execute(
                "INSERT INTO call_relations (caller, callee, file, line, caller_file)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(caller, callee, caller_file, line) DO NOTHING",
                params![rel.caller, rel.callee, rel.file, rel.line, rel.caller_file],
            )?;
        }
        Ok(())
    }

    fn insert_chunk(&self, row: &ChunkRow) -> Result<(), RepoContextError> {
        let files_json = serde_json::to_string(&row.files)
            .map_err(|e| RepoContextError::Schema(e.to_string()))?;
        self.conn.execute(
            "INSERT INTO chunks (chunk_id, files, token_count, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![row.chunk_id, files_json, row.token_count as i64, row.created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete_chunk(&self, chunk_id: &str) -> Result<(), RepoContextError> {
        self.conn.execute("DELETE FROM index_entries WHERE chunk_id = ?1", [chunk_id])?;
        self.conn.execute("DELETE FROM chunks WHERE chunk_id = ?1", [chunk_id])?;
        Ok(())
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<IndexEntry>, RepoContextError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, kind, file, start_line, end_line, chunk_id, signature
             FROM index_entries WHERE name = ?1 ORDER BY file, start_line",
        )?;
        let rows = stmt.query_map([name], row_to_index_entry)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn find_by_kind(&self, kind: SymbolKind) -> Result<Vec<IndexEntry>, RepoContextError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, kind, file, start_line, end_line, chunk_id, signature
             FROM index_entries WHERE kind = ?1 ORDER BY file, start_line",
        )?;
        let rows = stmt.query_map([kind.as_str()], row_to_index_entry)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn calls_from(&self, caller: &str) -> Result<Vec<CallRelation>, RepoContextError> {
        let mut stmt = self.conn.prepare(
            "SELECT caller, callee, file, line, caller_file
             FROM call_relations WHERE caller = ?1 ORDER BY file, line",
        )?;
        let rows = stmt.query_map([caller], row_to_call_relation)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn calls_to(&self, callee: &str) -> Result<Vec<CallRelation>, RepoContextError> {
        let mut stmt = self.conn.prepare(
            "SELECT caller, callee, file, line, caller_file
             FROM call_relations WHERE callee = ?1 ORDER BY caller_file, line",
        )?;
        let rows = stmt.query_map([callee], row_to_call_relation)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn chunk_row(&self, chunk_id: &str) -> Result<Option<ChunkRow>, RepoContextError> {
        let result = self.conn.query_row(
            "SELECT chunk_id, files, token_count, created_at FROM chunks WHERE chunk_id = ?1",
            [chunk_id],
            |row| {
                let files_json: String = row.get("files")?;
                let created_at: String = row.get("created_at")?;
                Ok((row.get::<_, String>("chunk_id")?, files_json, row.get::<_, i64>("token_count")?, created_at))
            },
        );
        match result {
            Ok((chunk_id, files_json, token_count, created_at)) => {
                let files: Vec<String> = serde_json::from_str(&files_json)
                    .map_err(|e| RepoContextError::Schema(e.to_string()))?;
                let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .map_err(|e| RepoContextError::Schema(e.to_string()))?;
                Ok(Some(ChunkRow { chunk_id, files, token_count: token_count as u64, created_at }))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete_entries_for_file(&self, file: &str) -> Result<(), RepoContextError> {
        self.conn.execute("DELETE FROM index_entries WHERE file = ?1", [file])?;
        self.conn
            .execute("DELETE FROM call_relations WHERE file = ?1 OR caller_file = ?1", [file])?;
        Ok(())
    }
}

impl SqliteStore {
    pub fn expected_schema_version(&self) -> i64 {
        SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Manifest;

    fn entry(name: &str, file: &str, line: u32) -> IndexEntry {
        IndexEntry {
            name: name.to_string(),
            kind: SymbolKind::Function,
            file: file.to_string(),
            start_line: line,
            end_line: line + 3,
            chunk_id: "chunk_0000000000000000".into(),
            signature: format!("func {}()", name),
        }
    }

    #[test]
    fn upsert_and_find_by_name_round_trips() {
        let store = SqliteStore::in_memory().unwrap();
        store.upsert_index_entries(&[entry("Process", "a.go", 10)]).unwrap();

        let found = store.find_by_name("Process").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file, "a.go");
    }

    #[test]
    fn upsert_is_idempotent_on_same_key() {
        let store = SqliteStore::in_memory().unwrap();
        store.upsert_index_entries(&[entry("Process", "a.go", 10)]).unwrap();
        let mut updated = entry("Process", "a.go", 10);
        updated.signature = "func Process(ctx context.Context)".into();
        store.upsert_index_entries(&[updated]).unwrap();

        let found = store.find_by_name("Process").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].signature, "func Process(ctx context.Context)");
    }

    #[test]
    fn call_relations_query_by_caller_and_callee() {
        let store = SqliteStore::in_memory().unwrap();
        let rel = CallRelation {
            caller: "main".into(),
            callee: "Process".into(),
            file: "a.go".into(),
            line: 5,
            caller_file: "main.go".into(),
        };
        store.upsert_call_relations(&[rel.clone()]).unwrap();

        assert_eq!(store.calls_from("main").unwrap().len(), 1);
        assert_eq!(store.calls_to("Process").unwrap().len(), 1);
        assert!(store.calls_from("nobody").unwrap().is_empty());
    }

    #[test]
    fn delete_entries_for_file_clears_both_tables() {
        let store = SqliteStore::in_memory().unwrap();
        store.upsert_index_entries(&[entry("Process", "a.go", 10)]).unwrap();
        store
            .upsert_call_relations(&[CallRelation {
                caller: "main".into(),
                callee: "Process".into(),
                file: "a.go".into(),
                line: 5,
                caller_file: "main.go".into(),
            }])
            .unwrap();

        store.delete_entries_for_file("a.go").unwrap();

        assert!(store.find_by_name("Process").unwrap().is_empty());
        assert!(store.calls_to("Process").unwrap().is_empty());
    }

    #[test]
    fn chunk_row_round_trips() {
        let store = SqliteStore::in_memory().unwrap();
        let row = ChunkRow {
            chunk_id: "chunk_0000000000000000".into(),
            files: vec!["a.go".into()],
            token_count: 42,
            created_at: Manifest::new().updated_at,
        };
        store.insert_chunk(&row).unwrap();
        let fetched = store.chunk_row("chunk_0000000000000000").unwrap().unwrap();
        assert_eq!(fetched.token_count, 42);
        assert_eq!(fetched.files, vec!["a.go".to_string()]);
    }

    #[test]
    fn insert_chunk_twice_with_same_id_fails() {
        let store = SqliteStore::in_memory().unwrap();
        let row = ChunkRow {
            chunk_id: "chunk_0000000000000000".into(),
            files: vec!["a.go".into()],
            token_count: 42,
            created_at: Manifest::new().updated_at,
        };
        store.insert_chunk(&row).unwrap();
        assert!(store.insert_chunk(&row).is_err());
    }

    #[test]
    fn delete_chunk_removes_row_and_its_index_entries() {
        let store = SqliteStore::in_memory().unwrap();
        let row = ChunkRow {
            chunk_id: "chunk_0000000000000000".into(),
            files: vec!["a.go".into()],
            token_count: 42,
            created_at: Manifest::new().updated_at,
        };
        store.insert_chunk(&row).unwrap();
        store
            .upsert_index_entries(&[entry("Process", "a.go", 10)])
            .unwrap();

        store.delete_chunk(&row.chunk_id).unwrap();

        assert!(store.find_by_name("Process").unwrap().is_empty());
        assert!(store.chunk_row(&row.chunk_id).unwrap().is_none());
    }
}
