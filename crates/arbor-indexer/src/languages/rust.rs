//! Rust language extractor

use arbor_core::{Result, Symbol, SymbolKind};
use tree_sitter::Node;

use super::{leading_comment, line_span, node_text, parse_source, signature_before};
use crate::extractor::LanguageExtractor;

pub struct RustExtractor;

impl RustExtractor {
    fn is_pub(node: Node) -> bool {
        let mut cursor = node.walk();
        let public = node
            .children(&mut cursor)
            .any(|c| c.kind() == "visibility_modifier");
        public
    }

    fn doc_comment(node: Node, source: &[u8]) -> Option<String> {
        leading_comment(node, source, &["attribute_item"], |text| {
            let text = text.trim_end();
            if let Some(line) = text.strip_prefix("///") {
                if line.starts_with('/') {
                    return None;
                }
                Some(line.strip_prefix(' ').unwrap_or(line).to_string())
            } else {
                text.strip_prefix("/**")
                    .and_then(|t| t.strip_suffix("*/"))
                    .map(|t| t.trim().to_string())
            }
        })
    }

    fn item_kind(kind: &str) -> Option<SymbolKind> {
        match kind {
            "function_item" => Some(SymbolKind::Function),
            "struct_item" => Some(SymbolKind::Struct),
            "trait_item" => Some(SymbolKind::Interface),
            "enum_item" | "type_item" | "union_item" => Some(SymbolKind::Type),
            _ => None,
        }
    }

    fn symbol(
        node: Node,
        source: &[u8],
        rel_path: &str,
        kind: SymbolKind,
        exported: bool,
        parent: Option<String>,
    ) -> Option<Symbol> {
        let name = node_text(node.child_by_field_name("name")?, source);
        let (line, line_end) = line_span(node);
        let body = match node.kind() {
            "type_item" => None,
            _ => node.child_by_field_name("body"),
        };

        Some(Symbol {
            name: name.to_string(),
            kind,
            exported,
            line,
            line_end,
            file_path: rel_path.to_string(),
            signature: signature_before(node, body, source)
                .trim_end_matches(';')
                .to_string(),
            docstring: Self::doc_comment(node, source),
            parent,
        })
    }

    /// Methods of an inherent or trait impl, parented by the implementing type.
    fn extract_impl(node: Node, source: &[u8], rel_path: &str, out: &mut Vec<Symbol>) {
        let Some(ty) = node.child_by_field_name("type") else {
            return;
        };
        let parent = node_text(ty, source)
            .split('<')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        let trait_impl = node.child_by_field_name("trait").is_some();

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let mut cursor = body.walk();
        for item in body.named_children(&mut cursor) {
            if item.kind() != "function_item" {
                continue;
            }
            let exported = trait_impl || Self::is_pub(item);
            if let Some(symbol) = Self::symbol(
                item,
                source,
                rel_path,
                SymbolKind::Method,
                exported,
                Some(parent.clone()),
            ) {
                out.push(symbol);
            }
        }
    }
}

impl LanguageExtractor for RustExtractor {
    fn extract(&self, rel_path: &str, source: &[u8]) -> Result<Vec<Symbol>> {
        let tree = parse_source(tree_sitter_rust::LANGUAGE.into(), rel_path, source)?;
        let root = tree.root_node();

        let mut symbols = Vec::new();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            if node.kind() == "impl_item" {
                Self::extract_impl(node, source, rel_path, &mut symbols);
                continue;
            }
            let Some(kind) = Self::item_kind(node.kind()) else {
                continue;
            };
            if let Some(symbol) = Self::symbol(node, source, rel_path, kind, Self::is_pub(node), None) {
                symbols.push(symbol);
            }
        }

        Ok(symbols)
    }

    fn is_test_file(&self, file_name: &str) -> bool {
        file_name == "tests.rs" || file_name.ends_with("_test.rs") || file_name.ends_with("_tests.rs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::test_utils::SAMPLE_RUST;

    #[test]
    fn extracts_items_and_impl_methods() {
        let symbols = RustExtractor.extract("src/lib.rs", SAMPLE_RUST.as_bytes()).unwrap();
        let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Entry", "Settle", "Currency", "new", "double", "total", "private_helper"]
        );

        let entry = &symbols[0];
        assert_eq!(entry.kind, SymbolKind::Struct);
        assert!(entry.exported);
        assert_eq!(entry.docstring.as_deref(), Some("A ledger entry."));
        assert_eq!(entry.signature, "pub struct Entry");

        assert_eq!(symbols[1].kind, SymbolKind::Interface);
        assert_eq!(symbols[2].kind, SymbolKind::Type);
        assert!(symbols[2].docstring.is_none());

        let new = &symbols[3];
        assert_eq!(new.kind, SymbolKind::Method);
        assert_eq!(new.parent.as_deref(), Some("Entry"));
        assert_eq!(new.signature, "pub fn new(amount: i64) -> Self");
        assert!(new.exported);
        assert!(!symbols[4].exported);

        let total = &symbols[5];
        assert_eq!(total.kind, SymbolKind::Function);
        assert_eq!(total.docstring.as_deref(), Some("Sum all entries."));
        assert!(!symbols[6].exported);
    }

    #[test]
    fn trait_impl_methods_are_exported() {
        let source = "struct S;\nimpl std::fmt::Display for S {\n    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result { Ok(()) }\n}\n";
        let symbols = RustExtractor.extract("s.rs", source.as_bytes()).unwrap();
        let fmt = symbols.iter().find(|s| s.name == "fmt").unwrap();
        assert!(fmt.exported);
        assert_eq!(fmt.parent.as_deref(), Some("S"));
    }
}
