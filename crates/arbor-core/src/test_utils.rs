//! Test utilities for Arbor

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// A Go source file with a documented function, a struct and a method.
pub const SAMPLE_GO: &str = r#"package billing

import "fmt"

// Invoice is a billable document.
type Invoice struct {
	ID    string
	Total int
}

// Renderer turns invoices into text.
type Renderer interface {
	Render(i *Invoice) string
}

// NewInvoice creates an invoice.
func NewInvoice(id string) *Invoice {
	return &Invoice{ID: id}
}

// Describe prints the invoice.
func (i *Invoice) Describe() string {
	return fmt.Sprintf("%s: %d", i.ID, i.Total)
}

func helper() int {
	return 42
}
"#;

/// A Rust source file covering functions, an impl block, a trait and an enum.
pub const SAMPLE_RUST: &str = r#"use std::fmt;

/// A ledger entry.
#[derive(Debug)]
pub struct Entry {
    pub amount: i64,
}

/// Something that can be settled.
pub trait Settle {
    fn settle(&self) -> i64;
}

pub enum Currency {
    Eur,
    Usd,
}

impl Entry {
    /// Create a new entry.
    pub fn new(amount: i64) -> Self {
        Entry { amount }
    }

    fn double(&self) -> i64 {
        self.amount * 2
    }
}

/// Sum all entries.
pub fn total(entries: &[Entry]) -> i64 {
    entries.iter().map(|e| e.amount).sum()
}

fn private_helper() {}
"#;

/// A complete module intent document.
pub const SAMPLE_SPEC: &str = "---\nversion: 0.1.0\nid: billing\ntype: library\ntitle: Billing\nsummary: Invoice handling\n---\n\n# Billing\n";

/// Create a repository with a specific file structure
pub fn create_repo_with_structure(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_structure(temp_dir.path(), structure);
    temp_dir
}

/// Write files below an existing directory, creating parents as needed.
pub fn write_structure(root: &Path, structure: &[(&str, &str)]) {
    for (path, content) in structure {
        let full_path = root.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        fs::write(&full_path, content).unwrap();
    }
}

/// Create empty directories below a root.
pub fn create_dirs(root: &Path, dirs: &[&str]) {
    for dir in dirs {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
}

/// A small project: a root hub, a documented Go module and a vendored dependency.
pub fn create_project() -> TempDir {
    create_repo_with_structure(&[
        ("billing/invoice.go", SAMPLE_GO),
        ("billing/codespec.md", SAMPLE_SPEC),
        ("ledger/entry.rs", SAMPLE_RUST),
        ("vendor/lib/dep.go", "package lib\n"),
        ("README.md", "# project\n"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project() {
        let temp_dir = create_project();
        let root = temp_dir.path();

        assert!(root.join("billing/invoice.go").exists());
        assert!(root.join("billing/codespec.md").exists());
        assert!(root.join("ledger/entry.rs").exists());
        assert!(root.join("vendor/lib/dep.go").exists());
    }
}
