//! Unit tests for arbor-core module

use crate::test_utils::*;
use crate::*;

#[test]
fn test_symbol_kind_labels() {
    assert_eq!(SymbolKind::from_label("function"), SymbolKind::Function);
    assert_eq!(SymbolKind::from_label("member"), SymbolKind::Method);
    assert_eq!(SymbolKind::from_label("trait"), SymbolKind::Interface);
    assert_eq!(SymbolKind::from_label("typedef"), SymbolKind::Type);
    assert_eq!(SymbolKind::from_label("macro"), SymbolKind::Other);
    assert_eq!(SymbolKind::Method.to_string(), "method");
}

#[test]
fn test_component_type_parsing() {
    assert_eq!("Library".parse::<ComponentType>(), Ok(ComponentType::Library));
    assert_eq!("app".parse::<ComponentType>(), Ok(ComponentType::App));
    assert!("widget".parse::<ComponentType>().is_err());
}

#[test]
fn test_model_document_roundtrip_fields() {
    let symbol = Symbol {
        name: "Describe".into(),
        kind: SymbolKind::Method,
        exported: true,
        line: 24,
        line_end: 26,
        file_path: "invoice.go".into(),
        signature: "func (i *Invoice) Describe() string".into(),
        docstring: Some("Describe prints the invoice.".into()),
        parent: Some("Invoice".into()),
    };
    let meta = ModelMeta {
        version: METADATA_VERSION.to_string(),
        integrity: Integrity {
            src_hash: "abc".into(),
            algorithm: "sha256".into(),
            ..Default::default()
        },
        symbols: vec![symbol.clone()],
    };

    let text = render_document(&meta, "\n# Model\n").unwrap();
    assert!(text.contains("kind: method"));
    assert!(text.contains("parent: Invoice"));

    let doc: Document<ModelMeta> = parse_document(&text).unwrap().unwrap();
    assert_eq!(doc.meta.symbols, vec![symbol]);
    assert_eq!(doc.meta.integrity.src_hash, "abc");
    assert_eq!(doc.body, "\n# Model\n");
}

#[test]
fn test_read_document_degrades_to_none() {
    let dir = create_repo_with_structure(&[("codemodel.md", "no header here\n")]);
    let missing: Option<Document<ModelMeta>> = read_document(&dir.path().join("absent.md")).unwrap();
    assert!(missing.is_none());

    let plain: Option<Document<ModelMeta>> = read_document(&dir.path().join(MODEL_FILE)).unwrap();
    assert!(plain.is_none());
}

#[test]
fn test_spec_document_parsing() {
    let doc: Document<SpecMeta> = parse_document(SAMPLE_SPEC).unwrap().unwrap();
    assert_eq!(doc.meta.component_type, "library");
    assert_eq!(doc.meta.description(), "Invoice handling");
    assert!(doc.meta.is_complete());
}

#[test]
fn test_tree_meta_serializes_excludes() {
    let meta = TreeMeta {
        version: METADATA_VERSION.to_string(),
        root: true,
        excludes: vec!["legacy".into()],
        ..Default::default()
    };
    let text = render_document(&meta, "").unwrap();
    let doc: Document<TreeMeta> = parse_document(&text).unwrap().unwrap();
    assert!(doc.meta.root);
    assert_eq!(doc.meta.excludes, vec!["legacy".to_string()]);
}

#[test]
fn test_boundary_marker_detection() {
    let dir = create_repo_with_structure(&[
        ("a/codespec.md", SAMPLE_SPEC),
        ("b/codemodel.md", "---\n---\n"),
        ("c/main.go", "package c\n"),
    ]);
    assert!(has_boundary_marker(&dir.path().join("a")));
    assert!(has_boundary_marker(&dir.path().join("b")));
    assert!(!has_boundary_marker(&dir.path().join("c")));
}

fn component(name: &str, is_valid: bool, children: Vec<Component>) -> Component {
    Component {
        name: name.into(),
        component_type: ComponentType::Module,
        path: format!("./{name}"),
        description: String::new(),
        last_modified: chrono::Utc::now(),
        has_spec: false,
        has_model: false,
        is_valid,
        children,
    }
}

#[test]
fn test_component_invalid_propagation() {
    let hub = component("hub", true, vec![component("leaf", false, vec![])]);
    assert!(hub.has_invalid());

    let clean = component("hub", true, vec![component("leaf", true, vec![])]);
    assert!(!clean.has_invalid());
}

#[test]
fn test_only_tool_failures_are_soft() {
    assert!(ArborError::ToolUnavailable("ctags".into()).is_soft());
    assert!(ArborError::Tool("exit status 2".into()).is_soft());
    assert!(!ArborError::Format("no header".into()).is_soft());
    assert!(!ArborError::io("/x", std::io::Error::other("boom")).is_soft());
}
