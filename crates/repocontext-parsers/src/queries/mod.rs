//! `include_str!`'d tree-sitter query sources, one per supported language.

pub const GO_QUERY: &str = include_str!("go.scm");

pub fn query_for_language(language: &str) -> Option<&'static str> {
    match language {
        "go" => Some(GO_QUERY),
        _ => None,
    }
}
