//! Native language extractors built on tree-sitter

pub mod go;
pub mod rust;

use std::path::Path;

use arbor_core::{ArborError, Result};
use tree_sitter::{Language, Node, Parser, Tree};

use crate::extractor::LanguageExtractor;

/// Extensions covered by a native extractor. The generic strategy skips them.
pub const NATIVE_EXTENSIONS: &[&str] = &["go", "rs"];

/// Get the native extractor for a file based on its extension
pub fn get_extractor(path: &Path) -> Option<Box<dyn LanguageExtractor>> {
    let ext = path.extension()?.to_str()?;

    match ext {
        "go" => Some(Box::new(go::GoExtractor)),
        "rs" => Some(Box::new(rust::RustExtractor)),
        _ => None,
    }
}

pub fn is_native(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| NATIVE_EXTENSIONS.contains(&ext))
}

/// Parse a whole file, rejecting trees that contain syntax errors.
pub(crate) fn parse_source(language: Language, rel_path: &str, source: &[u8]) -> Result<Tree> {
    let parse_error = |message: String| ArborError::Parse {
        path: rel_path.into(),
        message,
    };

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| parse_error(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| parse_error("parser returned no tree".to_string()))?;

    if tree.root_node().has_error() {
        return Err(parse_error("syntax error".to_string()));
    }
    Ok(tree)
}

pub(crate) fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

/// 1-based start and end lines of a node.
pub(crate) fn line_span(node: Node) -> (usize, usize) {
    (node.start_position().row + 1, node.end_position().row + 1)
}

/// Declaration text up to (not including) its body, collapsed to one line.
pub(crate) fn signature_before(node: Node, body: Option<Node>, source: &[u8]) -> String {
    let end = body.map_or(node.end_byte(), |b| b.start_byte());
    let raw = source
        .get(node.start_byte()..end)
        .map(String::from_utf8_lossy)
        .unwrap_or_default();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Contiguous comment block directly above `node`.
///
/// Walks previous siblings while they are comments accepted by `strip` or
/// kinds listed in `transparent`, stopping at the first blank line gap.
pub(crate) fn leading_comment<F>(
    node: Node,
    source: &[u8],
    transparent: &[&str],
    strip: F,
) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut lines = Vec::new();
    let mut next_row = node.start_position().row;
    let mut current = node.prev_sibling();

    while let Some(sibling) = current {
        if sibling.end_position().row + 1 < next_row {
            break;
        }
        if transparent.contains(&sibling.kind()) {
            next_row = sibling.start_position().row;
            current = sibling.prev_sibling();
            continue;
        }
        if !sibling.kind().contains("comment") {
            break;
        }
        match strip(node_text(sibling, source)) {
            Some(text) => lines.push(text),
            None => break,
        }
        next_row = sibling.start_position().row;
        current = sibling.prev_sibling();
    }

    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    let doc = lines.join("\n").trim().to_string();
    (!doc.is_empty()).then_some(doc)
}
