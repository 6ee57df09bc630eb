//! Gitignore-aware file discovery, handed off to `repocontext-parsers` one
//! file at a time.

use std::path::{Path, PathBuf};

use ignore::gitignore::GitignoreBuilder;
use ignore::WalkBuilder;

pub struct FileWalker {
    root: PathBuf,
}

impl FileWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileWalker { root: root.into() }
    }

    /// Every non-ignored file under the root, relative-pathed, that a
    /// registered parser would claim. Ignores `.repocontext/` itself so a
    /// rebuild never tries to index its own index. `extra_ignore_patterns`
    /// are gitignore-syntax globs from config, applied on top of
    /// `.gitignore`/`.repocontextignore`.
    pub fn walk(
        &self,
        registry: &repocontext_parsers::registry::Registry,
        extra_ignore_patterns: &[String],
    ) -> Vec<PathBuf> {
        let mut extra = GitignoreBuilder::new(&self.root);
        for pattern in extra_ignore_patterns {
            let _ = extra.add_line(None, pattern);
        }
        let extra = extra.build().unwrap_or_else(|_| {
            GitignoreBuilder::new(&self.root).build().expect("empty gitignore builder never fails")
        });

        let mut out = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .add_custom_ignore_filename(".repocontextignore")
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if path.starts_with(self.root.join(".repocontext")) {
                continue;
            }
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if extra.matched(path, false).is_ignore() {
                continue;
            }
            let path_str = path.to_string_lossy();
            if registry.parser_for(&path_str).is_some() {
                out.push(path.to_path_buf());
            }
        }
        out
    }

    pub fn relative_path(&self, abs: &Path) -> String {
        abs.strip_prefix(&self.root)
            .unwrap_or(abs)
            .to_string_lossy()
            .replace('\\', "/")
    }
}
