//! FROZEN CONTRACT — `LanguageParser`. A new language is added by
//! implementing this trait and registering it in `registry`; nothing
//! upstream (the CLI driver, the call-graph builder) should need to change.

use repocontext_core::FileContext;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unsupported extension for {path}")]
    UnsupportedExtension { path: String },
    #[error("syntax error in {path}: {message}")]
    Syntax { path: String, message: String },
    #[error("{path} is not valid UTF-8")]
    Encoding { path: String },
}

pub trait LanguageParser: Send + Sync {
    fn language_name(&self) -> &'static str;
    fn supported_extensions(&self) -> &'static [&'static str];

    /// Parses one file's raw bytes into a `FileContext`. `checksum` is
    /// passed in (rather than recomputed here) so callers can share the
    /// same hashing pass used for change detection.
    fn parse_file(&self, path: &str, content: &[u8], checksum: String) -> Result<FileContext, ParseError>;

    fn handles(&self, path: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| path.ends_with(ext))
    }
}
