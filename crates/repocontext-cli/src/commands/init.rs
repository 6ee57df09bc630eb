use std::path::Path;

use repocontext_core::manifest;
use repocontext_core::sqlite::SqliteStore;
use repocontext_core::types::{Manifest, RepoContextError};

pub fn run(path: &Path) -> Result<(), RepoContextError> {
    let repocontext_dir = path.join(".repocontext");
    std::fs::create_dir_all(&repocontext_dir)?;

    SqliteStore::open(&repocontext_dir.join("index.db"))?;
    manifest::save(&repocontext_dir, &Manifest::new())?;

    println!("initialized {}", repocontext_dir.display());
    Ok(())
}
