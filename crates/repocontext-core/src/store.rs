//! FROZEN CONTRACT — `RepoContextStore`. Downstream callers (the CLI driver,
//! future language parsers, future chunk strategies) depend on this trait's
//! shape; changing a method signature here is a breaking change for all of
//! them. Add new methods instead of widening existing ones where possible.

use crate::types::{CallRelation, ChunkRow, IndexEntry, RepoContextError, SymbolKind};

pub trait RepoContextStore {
    fn initialize_schema(&self) -> Result<(), RepoContextError>;
    fn schema_version(&self) -> Result<i64, RepoContextError>;

    /// Replaces any existing rows for the given files' symbols (keyed by
    /// `(name, file, start_line)`) with `entries`.
    fn upsert_index_entries(&self, entries: &[IndexEntry]) -> Result<(), RepoContextError>;
    fn upsert_call_relations(&self, relations: &[CallRelation]) -> Result<(), RepoContextError>;

    /// Plain insert, no upsert: fails with a unique-constraint error if
    /// `row.chunk_id` already exists. Callers that are re-chunking an
    /// existing chunk must `delete_chunk` it first.
    fn insert_chunk(&self, row: &ChunkRow) -> Result<(), RepoContextError>;

    /// Deletes a chunk's `index_entries` (cascaded by the `chunk_id` foreign
    /// key) and its `ChunkRow`. Does not touch `call_relations`, which are
    /// scoped per-file by `delete_entries_for_file`.
    fn delete_chunk(&self, chunk_id: &str) -> Result<(), RepoContextError>;

    fn find_by_name(&self, name: &str) -> Result<Vec<IndexEntry>, RepoContextError>;
    fn find_by_kind(&self, kind: SymbolKind) -> Result<Vec<IndexEntry>, RepoContextError>;
    fn calls_from(&self, caller: &str) -> Result<Vec<CallRelation>, RepoContextError>;
    fn calls_to(&self, callee: &str) -> Result<Vec<CallRelation>, RepoContextError>;

    fn chunk_row(&self, chunk_id: &str) -> Result<Option<ChunkRow>, RepoContextError>;
    fn delete_entries_for_file(&self, file: &str) -> Result<(), RepoContextError>;
}
