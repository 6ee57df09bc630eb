//! `.repocontext/config.json` loading. Mirrors the posture seen throughout
//! the corpus: a missing or unparseable config file is never fatal, it just
//! falls back to defaults with a warning on stderr.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

fn default_version() -> String {
    "1".to_string()
}

fn default_languages() -> Vec<String> {
    vec!["go".to_string()]
}

fn default_strategy() -> String {
    "per_file".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        ChunkingConfig { strategy: default_strategy() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoContextConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub chunking: ChunkingConfig,
}

impl Default for RepoContextConfig {
    fn default() -> Self {
        RepoContextConfig {
            version: default_version(),
            languages: default_languages(),
            ignore_patterns: Vec::new(),
            chunking: ChunkingConfig::default(),
        }
    }
}

impl RepoContextConfig {
    /// Reads `<repocontext_dir>/config.json`. Falls back to `Self::default()`
    /// on a missing file or a parse failure -- never returns an error.
    pub fn load(repocontext_dir: &Path) -> Self {
        let path = repocontext_dir.join("config.json");
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!(
                    "repocontext: warning: failed to parse {}: {}, using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}
