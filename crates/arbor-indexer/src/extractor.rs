//! Extraction seams: per-file language extractors and per-directory strategies

use std::path::Path;

use arbor_core::{Result, Symbol};

/// Extracts top-level symbols from one source file.
pub trait LanguageExtractor {
    /// `rel_path` is recorded on every produced symbol.
    fn extract(&self, rel_path: &str, source: &[u8]) -> Result<Vec<Symbol>>;

    /// Whether a file name denotes a test file for this language.
    fn is_test_file(&self, file_name: &str) -> bool;
}

/// Produces the flat symbol list of a module directory.
pub trait SymbolExtractor {
    fn name(&self) -> &'static str;

    fn parse_dir(&self, root: &Path) -> Result<Vec<Symbol>>;
}
