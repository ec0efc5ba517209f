//! Native extraction strategy: tree-sitter over every natively supported file

use std::fs;
use std::path::Path;

use arbor_core::{ArborError, IgnoreRules, Result, Symbol};
use tracing::{debug, warn};

use crate::extractor::SymbolExtractor;
use crate::languages::get_extractor;
use crate::walker::collect_scoped_files;

#[derive(Debug, Clone)]
pub struct NativeParser {
    rules: IgnoreRules,
    skip_tests: bool,
}

impl NativeParser {
    pub fn new(rules: IgnoreRules, skip_tests: bool) -> Self {
        Self { rules, skip_tests }
    }
}

impl SymbolExtractor for NativeParser {
    fn name(&self) -> &'static str {
        "native"
    }

    fn parse_dir(&self, root: &Path) -> Result<Vec<Symbol>> {
        let mut symbols = Vec::new();

        for file in collect_scoped_files(root, &self.rules)? {
            let Some(extractor) = get_extractor(&file.abs) else {
                continue;
            };
            if self.skip_tests && extractor.is_test_file(file.file_name()) {
                debug!("Skipping test file {}", file.rel);
                continue;
            }

            let source = match fs::read(&file.abs) {
                Ok(source) => source,
                Err(e) => {
                    warn!("Skipping unreadable file {}: {}", file.rel, e);
                    continue;
                }
            };

            match extractor.extract(&file.rel, &source) {
                Ok(found) => symbols.extend(found),
                Err(e @ ArborError::Parse { .. }) => warn!("{}", e),
                Err(e) => return Err(e),
            }
        }

        debug!("Native strategy found {} symbols in {}", symbols.len(), root.display());
        Ok(symbols)
    }
}
