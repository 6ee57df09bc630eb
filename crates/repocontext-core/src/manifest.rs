//! `manifest.json`: the small, human-readable summary of what's in the
//! chunk store. Written atomically (temp file + rename), same posture as
//! the blob store.

use std::fs;
use std::path::Path;

use crate::chunker::Chunk;
use crate::types::{ChunkInfo, Manifest, RepoContextError};

const MANIFEST_FILE: &str = "manifest.json";

pub fn load(repocontext_dir: &Path) -> Result<Manifest, RepoContextError> {
    let path = repocontext_dir.join(MANIFEST_FILE);
    if !path.is_file() {
        return Ok(Manifest::new());
    }
    let content = fs::read_to_string(&path)?;
    serde_json::from_str(&content)
        .map_err(|e| RepoContextError::Integrity(format!("corrupt manifest.json: {e}")))
}

pub fn save(repocontext_dir: &Path, manifest: &Manifest) -> Result<(), RepoContextError> {
    let path = repocontext_dir.join(MANIFEST_FILE);
    let tmp_path = repocontext_dir.join(format!("{MANIFEST_FILE}.tmp"));
    let content = serde_json::to_string_pretty(manifest)
        .map_err(|e| RepoContextError::Schema(e.to_string()))?;
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, &path)?;
    Ok(())
}

pub fn record_chunk(manifest: &mut Manifest, chunk: &Chunk) {
    let size: u64 = chunk.files.iter().map(|f| f.checksum.len() as u64).sum();
    manifest.chunks.insert(
        chunk.id.clone(),
        ChunkInfo {
            files: chunk.files.iter().map(|f| f.path.clone()).collect(),
            size,
            token_count: chunk.token_count,
            updated_at: manifest.updated_at,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::create_chunks;
    use crate::types::FileContext;
    use tempfile::tempdir;

    #[test]
    fn load_missing_manifest_returns_default() {
        let dir = tempdir().unwrap();
        let manifest = load(dir.path()).unwrap();
        assert_eq!(manifest.version, Manifest::CURRENT_VERSION);
        assert!(manifest.chunks.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let mut manifest = Manifest::new();
        let chunks = create_chunks(vec![FileContext::new("a.go", "go", "deadbeef".into())]);
        record_chunk(&mut manifest, &chunks[0]);

        save(dir.path(), &manifest).unwrap();
        let loaded = load(dir.path()).unwrap();

        assert_eq!(loaded.chunks.len(), 1);
        assert!(loaded.chunks.contains_key(&chunks[0].id));
    }

    #[test]
    fn corrupt_manifest_is_an_integrity_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "{not json").unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, RepoContextError::Integrity(_)));
    }
}
