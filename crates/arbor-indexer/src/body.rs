//! Symbol body lookup

use std::fs;
use std::path::Path;

use arbor_core::{ArborError, Result, Symbol};

/// Return lines `[line, line_end]` of the symbol's file, clamped to the file length.
pub fn get_symbol_body(root: &Path, symbol: &Symbol) -> Result<String> {
    if symbol.file_path.is_empty() {
        return Err(ArborError::NotFound(format!(
            "symbol '{}' has no file path",
            symbol.name
        )));
    }

    let path = root.join(&symbol.file_path);
    // Decoded lossily, like the extractors read it.
    let bytes = fs::read(&path).map_err(|e| ArborError::io(&path, e))?;
    let content = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = content.split('\n').collect();

    if symbol.line == 0 || symbol.line > lines.len() {
        return Err(ArborError::NotFound(format!(
            "start line {} out of range for {} ({} lines)",
            symbol.line,
            symbol.file_path,
            lines.len()
        )));
    }

    let end = symbol.line_end.clamp(symbol.line, lines.len());
    Ok(lines[symbol.line - 1..end].join("\n"))
}
