//! Chunk blob storage: one MessagePack-encoded file per chunk under
//! `.repocontext/chunks/<chunk_id>.bin`. Writes go through a `.tmp` sibling
//! and an atomic rename so a crash mid-write never leaves a truncated blob
//! behind for a later read to trip over.

use std::fs;
use std::path::{Path, PathBuf};

use crate::chunker::Chunk;
use crate::types::{FileContext, RepoContextError};

pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub fn new(repocontext_dir: &Path) -> Result<Self, RepoContextError> {
        let dir = repocontext_dir.join("chunks");
        fs::create_dir_all(&dir)?;
        Ok(BlobStore { dir })
    }

    fn path_for(&self, chunk_id: &str) -> PathBuf {
        self.dir.join(format!("{chunk_id}.bin"))
    }

    pub fn write_chunk(&self, chunk: &Chunk) -> Result<(), RepoContextError> {
        let bytes = rmp_serde::to_vec(&chunk.files)
            .map_err(|e| RepoContextError::Schema(format!("messagepack encode failed: {e}")))?;
        let final_path = self.path_for(&chunk.id);
        let tmp_path = self.dir.join(format!("{}.tmp", chunk.id));
        fs::write(&tmp_path, &bytes)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    pub fn read_chunk(&self, chunk_id: &str) -> Result<Vec<FileContext>, RepoContextError> {
        let path = self.path_for(chunk_id);
        let bytes = fs::read(&path)?;
        rmp_serde::from_slice(&bytes)
            .map_err(|e| RepoContextError::Integrity(format!("corrupt chunk blob {chunk_id}: {e}")))
    }

    pub fn exists(&self, chunk_id: &str) -> bool {
        self.path_for(chunk_id).is_file()
    }

    /// Removes a chunk's blob. Missing is not an error: deleting a chunk
    /// that was never written (or already removed) is a no-op.
    pub fn delete_chunk(&self, chunk_id: &str) -> Result<(), RepoContextError> {
        match fs::remove_file(self.path_for(chunk_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
