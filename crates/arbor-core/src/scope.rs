//! Scope rules: which directories and files belong to a module
//!
//! Two independent rule sets live here. [`IgnoreRules`] decides the in-scope
//! file set for hashing and symbol extraction. [`DirFilter`] decides which
//! directories the tree builder and the validator descend into. Both
//! traversals share one `DirFilter` so they always agree.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::config::ScopeConfig;
use crate::error::{ArborError, Result};
use crate::{MODEL_FILE, SPEC_FILE, TREE_FILE};

/// Dotfile convention.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

/// A directory carrying either metadata document is an independently managed module.
pub fn has_boundary_marker(dir: &Path) -> bool {
    dir.join(SPEC_FILE).is_file() || dir.join(MODEL_FILE).is_file()
}

/// The metadata documents themselves never count as source.
pub fn is_metadata_file(name: &str) -> bool {
    name == SPEC_FILE || name == MODEL_FILE || name == TREE_FILE
}

/// Root-relative path with `/` separators, empty for the root itself.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Compiled ignore rules for the hasher and the extraction strategies.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    dir_patterns: Vec<String>,
    file_globs: GlobSet,
    file_patterns: Vec<String>,
    exclude_hidden: bool,
}

impl IgnoreRules {
    pub fn new(scope: &ScopeConfig) -> Result<Self> {
        let mut globs = GlobSetBuilder::new();
        let mut file_patterns = Vec::new();

        for pattern in &scope.ignored_files {
            let pattern = pattern.trim().to_lowercase();
            if pattern.is_empty() {
                continue;
            }
            if pattern.starts_with('*') {
                let glob = GlobBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ArborError::Config(format!("invalid ignore pattern '{pattern}': {e}")))?;
                globs.add(glob);
            } else {
                file_patterns.push(pattern);
            }
        }

        let file_globs = globs
            .build()
            .map_err(|e| ArborError::Config(format!("failed to compile ignore patterns: {e}")))?;

        Ok(IgnoreRules {
            dir_patterns: scope
                .ignored_dirs
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            file_globs,
            file_patterns,
            exclude_hidden: scope.exclude_hidden,
        })
    }

    /// Case-insensitive substring match, or suffix match for `*`-prefixed patterns.
    pub fn ignores_dir(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.dir_patterns.iter().any(|pattern| match pattern.strip_prefix('*') {
            Some(suffix) => name.ends_with(suffix),
            None => name.contains(pattern.as_str()),
        })
    }

    /// Directory patterns also apply to file names, then file patterns and the dotfile rule.
    pub fn ignores_file(&self, name: &str) -> bool {
        if self.ignores_dir(name) {
            return true;
        }
        if self.exclude_hidden && is_hidden(name) {
            return true;
        }

        let lower = name.to_lowercase();
        if self.file_globs.is_match(&lower) {
            return true;
        }
        self.file_patterns
            .iter()
            .any(|p| lower == *p || lower.contains(p.as_str()))
    }
}

/// Ordered, duplicate-free set of directory names or root-relative path prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionSet(Vec<String>);

impl ExclusionSet {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = ExclusionSet::default();
        for entry in entries {
            set.insert(entry.as_ref());
        }
        set
    }

    fn normalize(entry: &str) -> String {
        entry
            .trim()
            .trim_start_matches("./")
            .trim_end_matches('/')
            .to_string()
    }

    /// Returns false when the entry was already present or empty.
    pub fn insert(&mut self, entry: &str) -> bool {
        let entry = Self::normalize(entry);
        if entry.is_empty() || self.0.contains(&entry) {
            return false;
        }
        self.0.push(entry);
        true
    }

    pub fn remove(&mut self, entry: &str) -> bool {
        let entry = Self::normalize(entry);
        let before = self.0.len();
        self.0.retain(|e| *e != entry);
        self.0.len() != before
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.contains(&Self::normalize(entry))
    }

    /// Name match, or root-relative path equal to or nested under an entry.
    pub fn matches(&self, name: &str, rel_path: &str) -> bool {
        self.0.iter().any(|entry| {
            name == entry
                || rel_path == entry
                || rel_path
                    .strip_prefix(entry.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

/// Directory filter shared by the tree builder and the validator.
#[derive(Debug, Clone, Default)]
pub struct DirFilter {
    ignored_names: Vec<String>,
    exclusions: ExclusionSet,
}

impl DirFilter {
    pub fn new(ignored_names: &[String], exclusions: ExclusionSet) -> Self {
        DirFilter {
            ignored_names: ignored_names.to_vec(),
            exclusions,
        }
    }

    /// True if a non-root directory must be left out of the traversal.
    pub fn skips(&self, name: &str, rel_path: &str) -> bool {
        is_hidden(name)
            || self.ignored_names.iter().any(|n| n == name)
            || self.exclusions.matches(name, rel_path)
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(dirs: &[&str], files: &[&str]) -> IgnoreRules {
        IgnoreRules::new(&ScopeConfig {
            ignored_dirs: dirs.iter().map(|s| s.to_string()).collect(),
            ignored_files: files.iter().map(|s| s.to_string()).collect(),
            exclude_hidden: true,
        })
        .unwrap()
    }

    #[test]
    fn dir_patterns_are_case_insensitive_substrings() {
        let r = rules(&["node_modules", "*_cache"], &[]);
        assert!(r.ignores_dir("Node_Modules"));
        assert!(r.ignores_dir("my_node_modules_copy"));
        assert!(r.ignores_dir("build_cache"));
        assert!(!r.ignores_dir("src"));
    }

    #[test]
    fn file_patterns() {
        let r = rules(&[], &["*.lock", "secrets"]);
        assert!(r.ignores_file("Cargo.LOCK"));
        assert!(r.ignores_file("my_secrets.txt"));
        assert!(r.ignores_file(".env"));
        assert!(!r.ignores_file("main.go"));
    }

    #[test]
    fn exclusions_match_names_and_prefixes() {
        let set = ExclusionSet::new(["legacy", "./tools/gen/", "legacy"]);
        assert_eq!(set.len(), 2);
        assert!(set.matches("legacy", "a/b/legacy"));
        assert!(set.matches("gen", "tools/gen"));
        assert!(set.matches("deep", "tools/gen/deep"));
        assert!(!set.matches("generator", "tools/generator"));
    }

    #[test]
    fn exclusion_insert_and_remove() {
        let mut set = ExclusionSet::default();
        assert!(set.insert("a"));
        assert!(!set.insert("a/"));
        assert!(set.insert("b"));
        assert!(set.remove("a"));
        assert!(!set.remove("a"));
        assert_eq!(set.into_vec(), vec!["b".to_string()]);
    }

    #[test]
    fn dir_filter_skips_hidden_and_ignored() {
        let filter = DirFilter::new(&["target".to_string()], ExclusionSet::new(["docs"]));
        assert!(filter.skips(".git", ".git"));
        assert!(filter.skips("target", "crate/target"));
        assert!(filter.skips("docs", "docs"));
        assert!(!filter.skips("src", "src"));
    }
}
