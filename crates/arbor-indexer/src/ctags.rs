//! Generic extraction strategy backed by Universal Ctags
//!
//! The file list is streamed to `ctags -L -` from a writer thread while the
//! calling thread waits on the process and drains its output. Writing the
//! whole list before reading would deadlock once both pipe buffers fill.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use arbor_core::{ArborError, IgnoreRules, Result, Symbol, SymbolKind, relative_path};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::extractor::SymbolExtractor;
use crate::languages::is_native;
use crate::walker::collect_scoped_files;

/// One line of `ctags --output-format=json`.
#[derive(Debug, Deserialize)]
pub struct CtagsEntry {
    #[serde(rename = "_type", default)]
    pub entry_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub line: usize,
    #[serde(default)]
    pub end: Option<usize>,
    #[serde(default)]
    pub pattern: String,
}

#[derive(Debug, Clone)]
pub struct CtagsParser {
    binary: String,
    rules: IgnoreRules,
}

impl CtagsParser {
    pub fn new(binary: impl Into<String>, rules: IgnoreRules) -> Self {
        Self {
            binary: binary.into(),
            rules,
        }
    }

    fn locate(&self) -> Result<PathBuf> {
        which::which(&self.binary)
            .map_err(|e| ArborError::ToolUnavailable(format!("{}: {}", self.binary, e)))
    }

    fn run(&self, binary: &Path, files: Vec<PathBuf>) -> Result<String> {
        let mut child = Command::new(binary)
            .args([
                "--output-format=json",
                "--fields=+nKe",
                "--exclude=*.go",
                "--exclude=*.rs",
                "-L",
                "-",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ArborError::Tool(format!("failed to start {}: {}", binary.display(), e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ArborError::Tool("ctags stdin unavailable".to_string()))?;

        let writer = thread::spawn(move || -> std::io::Result<()> {
            for file in &files {
                writeln!(stdin, "{}", file.display())?;
            }
            Ok(())
        });

        let output = child
            .wait_with_output()
            .map_err(|e| ArborError::Tool(format!("ctags did not finish: {}", e)))?;

        match writer.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("ctags closed its input early: {}", e),
            Err(_) => return Err(ArborError::Tool("ctags input writer panicked".to_string())),
        }

        if !output.status.success() {
            return Err(ArborError::Tool(format!(
                "ctags exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl SymbolExtractor for CtagsParser {
    fn name(&self) -> &'static str {
        "ctags"
    }

    fn parse_dir(&self, root: &Path) -> Result<Vec<Symbol>> {
        let binary = self.locate()?;

        let files: Vec<PathBuf> = collect_scoped_files(root, &self.rules)?
            .into_iter()
            .filter(|f| !is_native(&f.abs) && f.extension() != Some("md"))
            .map(|f| f.abs)
            .collect();

        if files.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Running {} over {} files", binary.display(), files.len());
        let stdout = self.run(&binary, files)?;
        Ok(parse_output(root, &stdout))
    }
}

/// Map ctags JSON lines into symbols. Malformed lines and pseudo-tags are dropped.
pub fn parse_output(root: &Path, stdout: &str) -> Vec<Symbol> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<CtagsEntry>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping malformed ctags line: {}", e);
                None
            }
        })
        .filter_map(|entry| map_entry(root, entry))
        .collect()
}

pub fn map_entry(root: &Path, entry: CtagsEntry) -> Option<Symbol> {
    if entry.name.is_empty() || entry.line == 0 {
        return None;
    }
    if !entry.entry_type.is_empty() && entry.entry_type != "tag" {
        return None;
    }

    let path = Path::new(&entry.path);
    let file_path = if path.is_absolute() {
        relative_path(root, path)
    } else {
        entry.path.clone()
    };

    Some(Symbol {
        name: entry.name,
        kind: SymbolKind::from_label(&entry.kind),
        exported: true,
        line: entry.line,
        line_end: entry.end.unwrap_or(entry.line).max(entry.line),
        file_path,
        signature: pattern_signature(&entry.pattern),
        docstring: None,
        parent: entry.scope.filter(|s| !s.is_empty()),
    })
}

/// Strip the `/^...$/` search anchors ctags wraps around the matched line.
pub fn pattern_signature(pattern: &str) -> String {
    let inner = pattern.strip_prefix("/^").unwrap_or(pattern);
    let inner = inner
        .strip_suffix("$/")
        .or_else(|| inner.strip_suffix('/'))
        .unwrap_or(inner);
    inner.replace("\\/", "/").trim().to_string()
}
