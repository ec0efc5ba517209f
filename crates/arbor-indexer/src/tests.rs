//! Unit tests for arbor-indexer module

use std::fs;
use std::time::{Duration, SystemTime};

use arbor_core::test_utils::*;
use arbor_core::{ArborConfig, ArborError, IgnoreRules, ScopeConfig, SymbolKind};
use sha2::{Digest, Sha256};

use crate::*;

fn hasher() -> ContentHasher {
    ContentHasher::new(&ScopeConfig::default()).unwrap()
}

fn offline_config() -> ArborConfig {
    let mut config = ArborConfig::default();
    config.parsing.ctags_binary = "arbor-missing-ctags".to_string();
    config
}

#[test]
fn test_hash_is_deterministic() {
    let dir = create_repo_with_structure(&[("a.go", "package a\n"), ("sub/b.go", "package sub\n")]);
    let first = hasher().hash_dir(dir.path()).unwrap();
    let second = hasher().hash_dir(dir.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
}

#[test]
fn test_rename_changes_hash() {
    let dir = create_repo_with_structure(&[("a.go", "package a\n")]);
    let before = hasher().hash_dir(dir.path()).unwrap();

    fs::rename(dir.path().join("a.go"), dir.path().join("b.go")).unwrap();
    let after = hasher().hash_dir(dir.path()).unwrap();
    assert_ne!(before, after);
}

#[test]
fn test_touch_keeps_hash() {
    let dir = create_repo_with_structure(&[("a.go", "package a\n")]);
    let before = hasher().hash_dir(dir.path()).unwrap();

    let file = fs::File::options().write(true).open(dir.path().join("a.go")).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(3600)).unwrap();
    drop(file);

    assert_eq!(before, hasher().hash_dir(dir.path()).unwrap());
}

#[test]
fn test_nested_module_is_opaque() {
    let dir = create_repo_with_structure(&[
        ("root.go", "package root\n"),
        ("child/codespec.md", SAMPLE_SPEC),
        ("child/inner.go", "package child\n"),
    ]);
    let before = hasher().hash_dir(dir.path()).unwrap();

    fs::write(dir.path().join("child/inner.go"), "package child\n\nfunc X() {}\n").unwrap();
    fs::write(dir.path().join("child/new.go"), "package child\n").unwrap();
    assert_eq!(before, hasher().hash_dir(dir.path()).unwrap());

    // Removing the marker folds the child back into the parent.
    fs::remove_file(dir.path().join("child/codespec.md")).unwrap();
    assert_ne!(before, hasher().hash_dir(dir.path()).unwrap());
}

#[test]
fn test_hash_input_is_sorted_path_then_content() {
    let dir = create_repo_with_structure(&[
        ("z.x", "zed"),
        ("a.x", "alpha"),
        ("node_modules/pkg/index.js", "ignored"),
    ]);

    let mut expected = Sha256::new();
    expected.update(b"a.x");
    expected.update(b"alpha");
    expected.update(b"z.x");
    expected.update(b"zed");
    let expected = format!("{:x}", expected.finalize());

    let digest = hasher().digest(dir.path()).unwrap();
    assert_eq!(digest.file_count, 2);
    assert_eq!(digest.hash, expected);
    assert!(digest.latest_modified.is_some());
}

#[test]
fn test_metadata_documents_do_not_affect_hash() {
    let dir = create_repo_with_structure(&[("a.go", "package a\n")]);
    let before = hasher().hash_dir(dir.path()).unwrap();

    fs::write(dir.path().join("codemodel.md"), "---\nversion: x\n---\n").unwrap();
    fs::write(dir.path().join("codetree.md"), "---\nroot: true\n---\n").unwrap();
    assert_eq!(before, hasher().hash_dir(dir.path()).unwrap());
}

#[test]
fn test_polyglot_without_ctags_returns_native_symbols() {
    let dir = create_repo_with_structure(&[
        ("invoice.go", SAMPLE_GO),
        ("invoice_test.go", "package billing\n\nfunc TestX() {}\n"),
        ("ledger/entry.rs", SAMPLE_RUST),
        ("script.py", "def run():\n    pass\n"),
    ]);

    let parser = PolyglotParser::new(&offline_config()).unwrap();
    let symbols = parser.parse_dir(dir.path()).unwrap();

    assert!(symbols.iter().any(|s| s.name == "NewInvoice" && s.file_path == "invoice.go"));
    assert!(symbols.iter().any(|s| s.name == "total" && s.file_path == "ledger/entry.rs"));
    assert!(!symbols.iter().any(|s| s.name == "TestX"));
    assert!(!symbols.iter().any(|s| s.file_path == "script.py"));
}

#[test]
fn test_test_files_kept_when_not_skipping() {
    let dir = create_repo_with_structure(&[("invoice_test.go", "package billing\n\nfunc TestX() {}\n")]);
    let mut config = offline_config();
    config.parsing.skip_tests = false;

    let symbols = PolyglotParser::new(&config).unwrap().parse_dir(dir.path()).unwrap();
    assert_eq!(symbols.len(), 1);
}

#[test]
fn test_unparseable_file_is_skipped() {
    let dir = create_repo_with_structure(&[("good.go", SAMPLE_GO), ("broken.go", "package x\nfunc (\n")]);
    let symbols = PolyglotParser::new(&offline_config())
        .unwrap()
        .parse_dir(dir.path())
        .unwrap();
    assert!(!symbols.is_empty());
    assert!(symbols.iter().all(|s| s.file_path == "good.go"));
}

#[test]
fn test_symbol_body_starts_with_declaration() {
    let dir = create_repo_with_structure(&[("invoice.go", SAMPLE_GO), ("entry.rs", SAMPLE_RUST)]);
    let parser = PolyglotParser::new(&offline_config()).unwrap();

    for symbol in parser.parse_dir(dir.path()).unwrap() {
        let body = parser.symbol_body(dir.path(), &symbol).unwrap();
        let first = body.lines().find(|l| !l.trim().is_empty()).unwrap().trim();
        assert!(
            first.contains(&symbol.name),
            "body of {} starts with {:?}",
            symbol.name,
            first
        );
        if symbol.kind == SymbolKind::Function {
            assert!(first.starts_with("func") || first.contains("fn "));
        }
    }
}

#[test]
fn test_single_spec_type_group_body_starts_at_spec() {
    let dir = create_repo_with_structure(&[("widget.go", "package p\n\ntype (\n\tWidget struct{}\n)\n")]);
    let parser = PolyglotParser::new(&offline_config()).unwrap();

    let symbols = parser.parse_dir(dir.path()).unwrap();
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].line, 4);

    let body = parser.symbol_body(dir.path(), &symbols[0]).unwrap();
    assert_eq!(body.trim(), "Widget struct{}");
}

#[test]
fn test_body_of_non_utf8_source_is_fetchable() {
    let dir = create_repo_with_structure(&[]);
    fs::write(
        dir.path().join("hello.go"),
        b"package p\n\n// caf\xe9 greeting\nfunc Hello() {}\n",
    )
    .unwrap();
    let parser = PolyglotParser::new(&offline_config()).unwrap();

    let symbols = parser.parse_dir(dir.path()).unwrap();
    let hello = symbols.iter().find(|s| s.name == "Hello").unwrap();
    let body = parser.symbol_body(dir.path(), hello).unwrap();
    assert_eq!(body, "func Hello() {}");
}

#[test]
fn test_hash_read_failure_is_fatal() {
    let dir = create_repo_with_structure(&[("a.go", "package a\n")]);
    fs::create_dir(dir.path().join("sub")).unwrap();

    // Opening a directory succeeds on Linux; reading it fails.
    let files = vec![ScopedFile {
        rel: "sub".to_string(),
        abs: dir.path().join("sub"),
    }];
    let err = hasher::hash_files(&files).unwrap_err();
    assert!(matches!(err, ArborError::Io { .. }));
}

#[test]
fn test_hash_skips_file_removed_after_collection() {
    let dir = create_repo_with_structure(&[("a.go", "package a\n"), ("b.go", "package b\n")]);
    let rules = IgnoreRules::new(&ScopeConfig::default()).unwrap();

    let before = collect_scoped_files(dir.path(), &rules).unwrap();
    fs::remove_file(dir.path().join("b.go")).unwrap();

    let digest = hasher::hash_files(&before).unwrap();
    assert_eq!(digest.file_count, 1);
    assert_eq!(digest.hash, hasher().hash_dir(dir.path()).unwrap());
}

#[test]
fn test_ctags_end_to_end_when_installed() {
    if which::which("ctags").is_err() {
        return;
    }
    let dir = create_repo_with_structure(&[
        ("invoice.go", SAMPLE_GO),
        ("tool.py", "class Tool:\n    def run(self):\n        pass\n"),
    ]);

    let symbols = PolyglotParser::new(&ArborConfig::default())
        .unwrap()
        .parse_dir(dir.path())
        .unwrap();

    assert!(symbols.iter().any(|s| s.name == "NewInvoice"));
    for symbol in symbols.iter().filter(|s| s.file_path.ends_with(".py")) {
        assert_eq!(symbol.file_path, "tool.py");
        assert!(symbol.exported);
    }
}
