//! Fixed-order aggregation of the native and generic strategies

use std::path::Path;

use arbor_core::{ArborConfig, IgnoreRules, Result, Symbol};
use tracing::{debug, warn};

use crate::body::get_symbol_body;
use crate::ctags::CtagsParser;
use crate::extractor::SymbolExtractor;
use crate::native::NativeParser;

/// Native symbols first, then generic ones, concatenated as-is.
///
/// A file matched by both strategies contributes twice. The generic strategy
/// excludes natively handled extensions, so this only happens when ctags is
/// pointed at languages the native set also claims.
#[derive(Debug, Clone)]
pub struct PolyglotParser {
    native: NativeParser,
    generic: CtagsParser,
}

impl PolyglotParser {
    pub fn new(config: &ArborConfig) -> Result<Self> {
        let rules = IgnoreRules::new(&config.scope)?;
        Ok(Self {
            native: NativeParser::new(rules.clone(), config.parsing.skip_tests),
            generic: CtagsParser::new(config.parsing.ctags_binary.clone(), rules),
        })
    }

    pub fn from_parts(native: NativeParser, generic: CtagsParser) -> Self {
        Self { native, generic }
    }

    /// Source text of a symbol previously produced under `root`.
    pub fn symbol_body(&self, root: &Path, symbol: &Symbol) -> Result<String> {
        get_symbol_body(root, symbol)
    }
}

impl SymbolExtractor for PolyglotParser {
    fn name(&self) -> &'static str {
        "polyglot"
    }

    fn parse_dir(&self, root: &Path) -> Result<Vec<Symbol>> {
        let mut symbols = self.native.parse_dir(root)?;

        match self.generic.parse_dir(root) {
            Ok(found) => symbols.extend(found),
            Err(e) if e.is_soft() => {
                warn!("{} strategy degraded to empty: {}", self.generic.name(), e);
            }
            Err(e) => return Err(e),
        }

        debug!("Extracted {} symbols from {}", symbols.len(), root.display());
        Ok(symbols)
    }
}
