//! Shared fixtures for integration tests.
//! Import from any integration test file with:
//! `#[path = "common/mod.rs"] mod common;`

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Writes `files` (relative path -> contents) under a fresh temp directory
/// and returns it alongside the directory root.
pub fn write_project(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path().to_path_buf();
    for (rel, content) in files {
        let full = root.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }
    (dir, root)
}
