//! Maps file extensions to the `LanguageParser` that handles them. Adding a
//! language means implementing the trait and registering it here -- nothing
//! else in the workspace is aware of the list.

use crate::go::GoParser;
use crate::parser::LanguageParser;

pub struct Registry {
    parsers: Vec<Box<dyn LanguageParser>>,
}

impl Registry {
    pub fn with_default_languages() -> Self {
        Registry { parsers: vec![Box::new(GoParser::new())] }
    }

    /// Registers only the languages named in `languages` (by
    /// `language_name()`). An empty list is treated as "no restriction" and
    /// registers every supported language, matching the config's own
    /// documented default.
    pub fn with_languages(languages: &[String]) -> Self {
        if languages.is_empty() {
            return Self::with_default_languages();
        }
        let all = Self::with_default_languages();
        Registry {
            parsers: all
                .parsers
                .into_iter()
                .filter(|p| languages.iter().any(|l| l == p.language_name()))
                .collect(),
        }
    }

    pub fn parser_for(&self, path: &str) -> Option<&dyn LanguageParser> {
        self.parsers.iter().find(|p| p.handles(path)).map(|p| p.as_ref())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_default_languages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_file_is_routed_to_the_go_parser() {
        let registry = Registry::with_default_languages();
        let parser = registry.parser_for("internal/service.go").unwrap();
        assert_eq!(parser.language_name(), "go");
    }

    #[test]
    fn unknown_extension_has_no_parser() {
        let registry = Registry::with_default_languages();
        assert!(registry.parser_for("README.md").is_none());
    }

    #[test]
    fn with_languages_excludes_unlisted_languages() {
        let registry = Registry::with_languages(&["python".to_string()]);
        assert!(registry.parser_for("internal/service.go").is_none());
    }

    #[test]
    fn with_languages_empty_list_registers_every_language() {
        let registry = Registry::with_languages(&[]);
        assert!(registry.parser_for("internal/service.go").is_some());
    }
}
