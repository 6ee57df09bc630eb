//! Thin shared layer over the `tree-sitter` crate: parser construction and
//! a couple of node-text helpers every language module needs.

use tree_sitter::{Node, Parser};

use crate::parser::ParseError;

pub fn parser_for_go() -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| ParseError::Syntax {
            path: String::new(),
            message: format!("failed to load Go grammar: {e}"),
        })?;
    Ok(parser)
}

pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Declaration text up to (but excluding) the opening `{` of the body,
/// collapsed to a single line. Good enough as a human-readable signature;
/// body text is never included. Multi-line parameter lists (idiomatic Go
/// style for functions with several parameters) are folded back onto one
/// line so the result is always a single-line string.
pub fn signature_text(node: Node<'_>, source: &str) -> String {
    let full = node_text(node, source);
    let sliced = match full.find('{') {
        Some(idx) => &full[..idx],
        None => full,
    };
    sliced.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn strip_pointer(type_text: &str) -> &str {
    type_text.trim_start_matches('*')
}
