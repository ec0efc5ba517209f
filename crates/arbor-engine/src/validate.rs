//! Structural validation of a project
//!
//! A directory is a leaf when it directly holds watched source files and a
//! hub when it has more than one visible subdirectory. Only significant
//! directories must carry metadata, and only leaves need a model document.
//! Findings are collected; nothing here aborts the traversal.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use arbor_core::{
    ArborConfig, FreshnessConfig, MODEL_FILE, SPEC_FILE, ValidationConfig, is_hidden,
    relative_path,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::tree::{TreeBuilder, read_tree_state};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub is_valid: bool,
}

/// How a directory relates to the metadata requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Significance {
    pub is_leaf: bool,
    pub is_hub: bool,
}

impl Significance {
    pub fn is_significant(&self) -> bool {
        self.is_leaf || self.is_hub
    }
}

pub struct Validator {
    config: ArborConfig,
}

impl Validator {
    pub fn new(config: ArborConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, root: &Path) -> Result<ValidationReport> {
        let config = self
            .config
            .load_for_project(root)
            .context("failed to load project config")?;
        let validation = &config.validation;

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for name in &validation.mandatory_files {
            if !root.join(name).exists() {
                errors.push(finding(root, format!("Missing required file: {name} at project root")));
            }
        }

        for dir in self.scanned_dirs(root, &config)? {
            let significance = analyze(&dir, &validation.freshness);
            if !significance.is_significant() {
                continue;
            }
            debug!("Checking {} ({:?})", dir.display(), significance);

            for name in &validation.module_files {
                if name == MODEL_FILE && !significance.is_leaf {
                    continue;
                }
                if !dir.join(name).is_file() {
                    errors.push(finding(
                        &dir,
                        format!(
                            "Missing required file: {name} (significant module). If this directory \
                             holds temporary, legacy or self-explanatory content, exclude it with \
                             arbor_manage_exclusions."
                        ),
                    ));
                }
            }

            let spec_path = dir.join(SPEC_FILE);
            if let Ok(content) = fs::read_to_string(&spec_path) {
                if let Some(reason) = check_spec_content(&content, validation) {
                    errors.push(finding(&dir, reason));
                }
                warnings.extend(check_freshness(&dir, &validation.freshness));
            }
        }

        let is_valid = errors.is_empty();
        info!(
            "Validated {}: {} errors, {} warnings",
            root.display(),
            errors.len(),
            warnings.len()
        );
        Ok(ValidationReport {
            errors,
            warnings,
            is_valid,
        })
    }

    /// Directories the validator visits, root first, in the tree builder's scope.
    pub fn scanned_dirs(&self, root: &Path, config: &ArborConfig) -> Result<Vec<PathBuf>> {
        let builder = TreeBuilder::new(&config.sync.tree);
        fs::metadata(root).with_context(|| format!("cannot read {}", root.display()))?;
        let state = read_tree_state(root).context("cannot load project exclusions")?;
        let filter = builder.filter(state.exclusions);

        let mut dirs = Vec::new();
        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            let mut children = subdirectories(&dir);
            children.retain(|child| {
                let name = file_name(child);
                !filter.skips(&name, &relative_path(root, child)) && !builder.is_shallow(&name)
            });
            // Reverse so the stack yields children in name order.
            children.reverse();
            stack.extend(children);
            dirs.push(dir);
        }
        Ok(dirs)
    }
}

pub fn analyze(dir: &Path, freshness: &FreshnessConfig) -> Significance {
    let Ok(entries) = fs::read_dir(dir) else {
        return Significance::default();
    };

    let mut has_code = false;
    let mut subdirs = 0;
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().to_string();
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            if !is_hidden(&name) {
                subdirs += 1;
            }
        } else if freshness.has_watched_extension(&name) {
            has_code = true;
        }
    }

    Significance {
        is_leaf: has_code,
        is_hub: subdirs > 1,
    }
}

/// Forbidden placeholders first, then required keys. One finding at most.
pub fn check_spec_content(content: &str, validation: &ValidationConfig) -> Option<String> {
    if let Some(forbidden) = validation
        .forbidden_strings
        .iter()
        .find(|s| content.contains(s.as_str()))
    {
        return Some(format!("{SPEC_FILE} contains forbidden '{forbidden}' placeholders"));
    }
    validation
        .required_spec_keys
        .iter()
        .find(|key| !content.contains(key.as_str()))
        .map(|key| format!("{SPEC_FILE} invalid structure (missing '{key}')"))
}

fn check_freshness(dir: &Path, freshness: &FreshnessConfig) -> Vec<Finding> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let newest_code = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|e| freshness.is_watched(&e.file_name().to_string_lossy()))
        .filter_map(|e| e.metadata().and_then(|m| m.modified()).ok())
        .max();
    let Some(newest_code) = newest_code else {
        return Vec::new();
    };

    let mut warnings = Vec::new();
    for (doc, label) in [(SPEC_FILE, "CodeSpec"), (MODEL_FILE, "CodeModel")] {
        let Ok(doc_time) = fs::metadata(dir.join(doc)).and_then(|m| m.modified()) else {
            continue;
        };
        if doc_time < newest_code {
            warnings.push(finding(
                dir,
                format!(
                    "Stale {label}: {doc} ({}) is older than source code ({})",
                    rfc3339(doc_time),
                    rfc3339(newest_code)
                ),
            ));
        }
    }
    warnings
}

fn subdirectories(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .collect();
    dirs.sort();
    dirs
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn finding(path: &Path, reason: String) -> Finding {
    Finding {
        path: path.display().to_string(),
        reason,
    }
}

fn rfc3339(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
}
