//! Serial half of the pipeline: call-graph resolution, chunking, and
//! persistence. Parsing (the parallel half, driven by `rayon` over the file
//! list) happens upstream in `repocontext-parsers`/the CLI driver and hands
//! this module a `Vec<FileContext>` to finish processing.
//!
//! Everything here runs through a single store/connection so call-graph
//! writes and chunk writes stay consistent with each other; cancellation is
//! checked between files, never mid-file.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::blobstore::BlobStore;
use crate::callgraph::{build_across_files, build_within_file};
use crate::chunker::create_chunks;
use crate::manifest::{self, record_chunk};
use crate::sqlite::SqliteStore;
use crate::store::RepoContextStore;
use crate::types::{
    CallRelation, FileContext, IndexEntry, Manifest, RepoContextError, SymbolKind,
};

#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct BuildSummary {
    pub files_indexed: usize,
    pub symbols_indexed: usize,
    pub edges_resolved: usize,
}

/// Resolves the call graph across `files`, chunks them, and persists
/// everything under `repocontext_dir`. Checked for cancellation once per
/// file during both the resolution loop and the persistence loop.
pub fn run(
    files: Vec<FileContext>,
    repocontext_dir: &Path,
    cancel: &CancellationToken,
) -> Result<BuildSummary, RepoContextError> {
    let mut files = files;

    for file in &mut files {
        if cancel.is_cancelled() {
            return Err(RepoContextError::Cancelled);
        }
        build_within_file(file);
    }
    if cancel.is_cancelled() {
        return Err(RepoContextError::Cancelled);
    }
    // Deterministic, lexicographic iteration order for the whole-repo pass,
    // independent of the order the filesystem walk happened to produce.
    files.sort_by(|a, b| a.path.cmp(&b.path));
    build_across_files(&mut files);

    let store = SqliteStore::open(&repocontext_dir.join("index.db"))?;
    let blobs = BlobStore::new(repocontext_dir)?;
    let mut manifest_doc = manifest::load(repocontext_dir).unwrap_or_else(|_| Manifest::new());
    manifest_doc.updated_at = chrono::Utc::now();

    let chunks = create_chunks(files);

    let mut symbols_indexed = 0usize;
    let mut edges_resolved = 0usize;

    for chunk in &chunks {
        if cancel.is_cancelled() {
            return Err(RepoContextError::Cancelled);
        }

        // A rebuild produces the same chunk_id for an unchanged file (chunk
        // IDs are a pure function of path), so clear any prior row/blob
        // before inserting fresh ones rather than upserting over them.
        store.delete_chunk(&chunk.id)?;
        blobs.delete_chunk(&chunk.id)?;

        blobs.write_chunk(chunk)?;
        record_chunk(&mut manifest_doc, chunk);
        store.insert_chunk(&crate::types::ChunkRow {
            chunk_id: chunk.id.clone(),
            files: chunk.files.iter().map(|f| f.path.clone()).collect(),
            token_count: chunk.token_count,
            created_at: manifest_doc.updated_at,
        })?;

        for file in &chunk.files {
            store.delete_entries_for_file(&file.path)?;

            let mut entries = Vec::new();
            for f in &file.functions {
                let kind = if f.is_method() { SymbolKind::Method } else { SymbolKind::Function };
                entries.push(IndexEntry {
                    name: f.name.clone(),
                    kind,
                    file: file.path.clone(),
                    start_line: f.start_line,
                    end_line: f.end_line,
                    chunk_id: chunk.id.clone(),
                    signature: f.signature.clone(),
                });
            }
            for t in &file.types {
                entries.push(IndexEntry {
                    name: t.name.clone(),
                    kind: SymbolKind::Type,
                    file: file.path.clone(),
                    start_line: t.start_line,
                    end_line: t.end_line,
                    chunk_id: chunk.id.clone(),
                    signature: format!("{:?} {}", t.kind, t.name),
                });
            }
            for v in &file.variables {
                entries.push(IndexEntry {
                    name: v.name.clone(),
                    kind: SymbolKind::Variable,
                    file: file.path.clone(),
                    start_line: v.start_line,
                    end_line: v.end_line,
                    chunk_id: chunk.id.clone(),
                    signature: format!("var {} {}", v.name, v.type_name),
                });
            }
            for c in &file.constants {
                entries.push(IndexEntry {
                    name: c.name.clone(),
                    kind: SymbolKind::Constant,
                    file: file.path.clone(),
                    start_line: c.start_line,
                    end_line: c.end_line,
                    chunk_id: chunk.id.clone(),
                    signature: format!("const {} {}", c.name, c.type_name),
                });
            }
            symbols_indexed += entries.len();
            store.upsert_index_entries(&entries)?;

            let mut relations = Vec::new();
            for f in &file.functions {
                for local in &f.local_calls {
                    relations.push(CallRelation {
                        caller: f.name.clone(),
                        callee: local.clone(),
                        file: file.path.clone(),
                        line: f.start_line,
                        caller_file: file.path.clone(),
                    });
                }
                for cross in &f.cross_file_calls {
                    relations.push(CallRelation {
                        caller: f.name.clone(),
                        callee: cross.function_name.clone(),
                        file: cross.file.clone(),
                        line: cross.line,
                        caller_file: file.path.clone(),
                    });
                }
            }
            edges_resolved += relations.len();
            store.upsert_call_relations(&relations)?;
        }
    }

    manifest::save(repocontext_dir, &manifest_doc)?;

    Ok(BuildSummary {
        files_indexed: chunks.iter().map(|c| c.files.len()).sum(),
        symbols_indexed,
        edges_resolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Function, RawCallSite};
    use tempfile::tempdir;

    #[test]
    fn run_persists_symbols_and_edges_for_a_simple_call_chain() {
        let dir = tempdir().unwrap();

        let mut main_fn = Function::new("main");
        main_fn.start_line = 3;
        main_fn.end_line = 6;
        main_fn.signature = "func main()".into();
        main_fn.raw_call_sites.push(RawCallSite {
            textual: "process".into(),
            line: 4,
            call_type: crate::types::CallType::Function,
        });

        let mut process_fn = Function::new("process");
        process_fn.start_line = 8;
        process_fn.end_line = 10;
        process_fn.signature = "func process()".into();

        let file = FileContext {
            functions: vec![main_fn, process_fn],
            ..FileContext::new("main.go", "go", "deadbeef".into())
        };

        let cancel = CancellationToken::new();
        let summary = run(vec![file], dir.path(), &cancel).unwrap();

        assert_eq!(summary.files_indexed, 1);
        assert_eq!(summary.symbols_indexed, 2);
        assert_eq!(summary.edges_resolved, 1);

        let store = SqliteStore::open(&dir.path().join("index.db")).unwrap();
        let found = store.find_by_name("process").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(store.calls_from("main").unwrap().len(), 1);
    }

    #[test]
    fn run_rejects_already_cancelled_token() {
        let dir = tempdir().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = run(vec![], dir.path(), &cancel);
        // zero files means the cancellation check inside the (empty) loop
        // never executes; the pipeline should still complete successfully
        // on an empty input rather than report cancellation it never saw.
        assert!(err.is_ok());
    }
}
