//! Go language extractor using tree-sitter

use arbor_core::{Result, Symbol, SymbolKind};
use tree_sitter::Node;

use super::{leading_comment, line_span, node_text, parse_source, signature_before};
use crate::extractor::LanguageExtractor;

pub struct GoExtractor;

impl GoExtractor {
    fn is_exported(name: &str) -> bool {
        name.chars().next().is_some_and(char::is_uppercase)
    }

    fn doc_comment(node: Node, source: &[u8]) -> Option<String> {
        leading_comment(node, source, &[], |text| {
            if let Some(line) = text.strip_prefix("//") {
                Some(line.strip_prefix(' ').unwrap_or(line).trim_end().to_string())
            } else {
                text.strip_prefix("/*")
                    .and_then(|t| t.strip_suffix("*/"))
                    .map(|t| t.trim().to_string())
            }
        })
    }

    fn extract_function(node: Node, source: &[u8], rel_path: &str) -> Option<Symbol> {
        let name = node_text(node.child_by_field_name("name")?, source);
        let (line, line_end) = line_span(node);

        let parent = if node.kind() == "method_declaration" {
            node.child_by_field_name("receiver")
                .and_then(|receiver| Self::receiver_type(receiver, source))
        } else {
            None
        };

        Some(Symbol {
            name: name.to_string(),
            kind: if parent.is_some() || node.kind() == "method_declaration" {
                SymbolKind::Method
            } else {
                SymbolKind::Function
            },
            exported: Self::is_exported(name),
            line,
            line_end,
            file_path: rel_path.to_string(),
            signature: signature_before(node, node.child_by_field_name("body"), source),
            docstring: Self::doc_comment(node, source),
            parent,
        })
    }

    /// Receiver type name with pointer and type parameters removed.
    fn receiver_type(receiver: Node, source: &[u8]) -> Option<String> {
        let mut cursor = receiver.walk();
        let param = receiver
            .named_children(&mut cursor)
            .find(|c| c.kind() == "parameter_declaration")?;
        let ty = param.child_by_field_name("type")?;

        let name = node_text(ty, source)
            .trim_start_matches('*')
            .split('[')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        (!name.is_empty()).then_some(name)
    }

    fn extract_types(node: Node, source: &[u8], rel_path: &str, out: &mut Vec<Symbol>) {
        let docstring = Self::doc_comment(node, source);
        let mut cursor = node.walk();
        let specs: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "type_spec" || c.kind() == "type_alias")
            .collect();
        // `type X ...` spans the declaration; inside `type ( ... )` each spec spans itself.
        let mut paren_cursor = node.walk();
        let grouped = node.children(&mut paren_cursor).any(|c| c.kind() == "(");

        for spec in specs {
            let Some(name_node) = spec.child_by_field_name("name") else {
                continue;
            };
            let name = node_text(name_node, source);

            let (kind, keyword) = match spec.child_by_field_name("type").map(|t| t.kind()) {
                _ if spec.kind() == "type_alias" => (SymbolKind::Type, ""),
                Some("struct_type") => (SymbolKind::Struct, " struct"),
                Some("interface_type") => (SymbolKind::Interface, " interface"),
                _ => (SymbolKind::Type, ""),
            };

            let (line, line_end) = line_span(if grouped { spec } else { node });
            out.push(Symbol {
                name: name.to_string(),
                kind,
                exported: Self::is_exported(name),
                line,
                line_end,
                file_path: rel_path.to_string(),
                signature: format!("type {name}{keyword}"),
                docstring: if grouped {
                    Self::doc_comment(spec, source).or_else(|| docstring.clone())
                } else {
                    docstring.clone()
                },
                parent: None,
            });
        }
    }
}

impl LanguageExtractor for GoExtractor {
    fn extract(&self, rel_path: &str, source: &[u8]) -> Result<Vec<Symbol>> {
        let tree = parse_source(tree_sitter_go::LANGUAGE.into(), rel_path, source)?;
        let root = tree.root_node();

        let mut symbols = Vec::new();
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "function_declaration" | "method_declaration" => {
                    if let Some(symbol) = Self::extract_function(node, source, rel_path) {
                        symbols.push(symbol);
                    }
                }
                "type_declaration" => Self::extract_types(node, source, rel_path, &mut symbols),
                _ => {}
            }
        }

        Ok(symbols)
    }

    fn is_test_file(&self, file_name: &str) -> bool {
        file_name.ends_with("_test.go")
    }
}
