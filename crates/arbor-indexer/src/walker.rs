//! Boundary-aware collection of a module's in-scope files

use std::fs;
use std::path::{Path, PathBuf};

use arbor_core::{ArborError, IgnoreRules, Result, has_boundary_marker, is_metadata_file, relative_path};
use ignore::WalkBuilder;
use tracing::debug;

/// A file that belongs to the module rooted at the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedFile {
    /// Root-relative path with `/` separators.
    pub rel: String,
    pub abs: PathBuf,
}

impl ScopedFile {
    pub fn file_name(&self) -> &str {
        self.rel.rsplit('/').next().unwrap_or(&self.rel)
    }

    pub fn extension(&self) -> Option<&str> {
        self.abs.extension().and_then(|e| e.to_str())
    }
}

/// Walk `root` recursively and return its in-scope regular files sorted by relative path.
///
/// Below the root, directories matching an ignore pattern or carrying a
/// boundary marker are pruned with their whole subtree. Files are filtered by
/// the ignore rules and the dotfile rule; metadata documents never qualify.
pub fn collect_scoped_files(root: &Path, rules: &IgnoreRules) -> Result<Vec<ScopedFile>> {
    let meta = fs::metadata(root).map_err(|e| ArborError::io(root, e))?;
    if !meta.is_dir() {
        return Err(ArborError::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let dir_rules = rules.clone();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if !is_dir {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if dir_rules.ignores_dir(&name) {
                return false;
            }
            !has_boundary_marker(entry.path())
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| ArborError::Walk {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if is_metadata_file(&name) || rules.ignores_file(&name) {
            continue;
        }

        files.push(ScopedFile {
            rel: relative_path(root, entry.path()),
            abs: entry.path().to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.rel.cmp(&b.rel));
    debug!("Collected {} in-scope files under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::ScopeConfig;
    use arbor_core::test_utils::create_repo_with_structure;

    #[test]
    fn prunes_boundaries_and_ignored_dirs() {
        let dir = create_repo_with_structure(&[
            ("main.go", "package main\n"),
            ("pkg/util.go", "package pkg\n"),
            ("child/codespec.md", "---\ntitle: c\n---\n"),
            ("child/inner.go", "package child\n"),
            ("node_modules/x/index.js", "x\n"),
            (".env", "SECRET=1\n"),
            ("codemodel.md", "---\n---\n"),
        ]);
        let rules = IgnoreRules::new(&ScopeConfig::default()).unwrap();

        let files = collect_scoped_files(dir.path(), &rules).unwrap();
        let rels: Vec<&str> = files.iter().map(|f| f.rel.as_str()).collect();
        assert_eq!(rels, vec!["main.go", "pkg/util.go"]);
    }

    #[test]
    fn missing_root_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let rules = IgnoreRules::new(&ScopeConfig::default()).unwrap();
        let err = collect_scoped_files(&dir.path().join("nope"), &rules).unwrap_err();
        assert!(matches!(err, ArborError::Io { .. }));
    }
}
