//! Groups parsed files into chunks for the blob store. The default (and
//! only shipped) strategy is one chunk per file; `ChunkStrategy` exists so a
//! future multi-file packing strategy can slot in without touching callers.

use crate::hash::chunk_id_for_path;
use crate::types::FileContext;

#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub files: Vec<FileContext>,
    pub token_count: u64,
}

pub trait ChunkStrategy {
    fn chunk(&self, files: Vec<FileContext>) -> Vec<Chunk>;
}

/// One `FileContext` per chunk, `chunk_id` derived from the file path alone
/// so the same file always lands in the same chunk across runs.
pub struct PerFileStrategy;

impl ChunkStrategy for PerFileStrategy {
    fn chunk(&self, files: Vec<FileContext>) -> Vec<Chunk> {
        files
            .into_iter()
            .map(|fc| {
                let id = chunk_id_for_path(&fc.path);
                let token_count = estimate_tokens(&fc);
                Chunk { id, files: vec![fc], token_count }
            })
            .collect()
    }
}

/// Deliberately crude and deliberately deterministic: four characters of
/// signature/name text per token, floor of 1. Good enough for budget
/// comparisons; never claims source-level accuracy.
pub fn estimate_tokens(fc: &FileContext) -> u64 {
    let mut chars: u64 = 0;
    for f in &fc.functions {
        chars += f.signature.len() as u64;
    }
    for t in &fc.types {
        chars += t.name.len() as u64;
        for m in &t.methods {
            chars += m.signature.len() as u64;
        }
    }
    for v in &fc.variables {
        chars += v.name.len() as u64 + v.type_name.len() as u64;
    }
    for c in &fc.constants {
        chars += c.name.len() as u64 + c.type_name.len() as u64;
    }
    (chars / 4).max(1)
}

pub fn create_chunks(files: Vec<FileContext>) -> Vec<Chunk> {
    PerFileStrategy.chunk(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fc(path: &str) -> FileContext {
        FileContext::new(path, "go", "deadbeef".into())
    }

    #[test]
    fn chunk_id_is_deterministic_across_runs() {
        let a = create_chunks(vec![fc("a/b.go")]);
        let b = create_chunks(vec![fc("a/b.go")]);
        assert_eq!(a[0].id, b[0].id);
    }

    #[test]
    fn distinct_paths_get_distinct_chunk_ids() {
        let chunks = create_chunks(vec![fc("a.go"), fc("b.go")]);
        assert_ne!(chunks[0].id, chunks[1].id);
    }

    #[test]
    fn token_estimate_is_never_zero() {
        let chunks = create_chunks(vec![fc("empty.go")]);
        assert!(chunks[0].token_count >= 1);
    }

    #[test]
    fn per_file_strategy_never_merges_files() {
        let chunks = create_chunks(vec![fc("a.go"), fc("b.go"), fc("c.go")]);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.files.len() == 1));
    }
}
