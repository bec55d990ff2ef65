//! Shared tree-sitter helpers for the TypeScript extractors.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use tree_sitter::{Language, Node, Parser, Tree};

static TYPESCRIPT: Lazy<Language> =
    Lazy::new(|| tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into());

/// Parses TypeScript source into a syntax tree.
///
/// The parse is error-tolerant: malformed input yields a tree with
/// `ERROR` nodes rather than a failure, so extraction can recover
/// whatever structure is intact.
///
/// # Errors
///
/// Returns an error only if the parser itself cannot be initialized.
pub(crate) fn parse(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&TYPESCRIPT)?;

    parser
        .parse(source, None)
        .ok_or_else(|| Error::parser("TypeScript parse returned no tree"))
}

/// Returns the source text of a node.
pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Strips one layer of matching quote characters from a literal's text.
pub(crate) fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), trimmed.chars().last()) {
        (Some(open), Some(close))
            if trimmed.len() >= 2 && open == close && matches!(open, '"' | '\'' | '`') =>
        {
            &trimmed[1..trimmed.len() - 1]
        }
        _ => trimmed,
    }
}

/// Finds the first named descendant of `node` with the given kind,
/// searching depth-first.
pub(crate) fn find_descendant<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    if node.kind() == kind {
        return Some(node);
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(found) = find_descendant(child, kind) {
            return Some(found);
        }
    }
    None
}
