use std::path::Path;

use rayon::prelude::*;
use repocontext_core::config::RepoContextConfig;
use repocontext_core::hash::checksum_bytes;
use repocontext_core::pipeline::{self, CancellationToken};
use repocontext_core::types::{FileContext, RepoContextError};
use repocontext_parsers::registry::Registry;

use crate::walker::FileWalker;

pub fn run(path: &Path) -> Result<(), RepoContextError> {
    let repocontext_dir = path.join(".repocontext");
    std::fs::create_dir_all(&repocontext_dir)?;

    let config = RepoContextConfig::load(&repocontext_dir);
    let registry = Registry::with_languages(&config.languages);
    let walker = FileWalker::new(path);
    let files = walker.walk(&registry, &config.ignore_patterns);

    let parsed: Vec<FileContext> = files
        .par_iter()
        .filter_map(|abs_path| {
            let rel = walker.relative_path(abs_path);
            let bytes = std::fs::read(abs_path).ok()?;
            let checksum = checksum_bytes(&bytes);
            let parser = registry.parser_for(&rel)?;
            match parser.parse_file(&rel, &bytes, checksum) {
                Ok(fc) => Some(fc),
                Err(e) => {
                    eprintln!("repocontext: skipping {rel}: {e}");
                    None
                }
            }
        })
        .collect();

    let cancel = CancellationToken::new();
    let summary = pipeline::run(parsed, &repocontext_dir, &cancel)?;

    println!(
        "files={} symbols={} edges={}",
        summary.files_indexed, summary.symbols_indexed, summary.edges_resolved
    );
    Ok(())
}
