//! Project component tree
//!
//! The exclusion set is read once from the root's `codetree.md` and passed
//! down the recursion unchanged, so every level sees the same root-scoped
//! rules.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use arbor_core::{
    ArborError, Component, ComponentType, DirFilter, Document, ExclusionSet, METADATA_VERSION,
    MODEL_FILE, SPEC_FILE, SpecMeta, TREE_FILE, TreeConfig, TreeMeta, Verification, read_document,
    parse_document, relative_path,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

pub const DEPENDENCY_DESCRIPTION: &str = "External dependencies (not scanned)";

/// What a rebuild keeps from an existing `codetree.md`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeState {
    pub exclusions: ExclusionSet,
    /// Free-form text after the header, or the whole file when it has no header.
    pub body: Option<String>,
}

/// Only the exclusion list is needed; the rest of the header is rebuilt.
#[derive(Debug, Default, Deserialize)]
struct PersistedExcludes {
    #[serde(default)]
    excludes: Vec<String>,
}

/// Read the persisted state of a project root.
///
/// A missing document yields an empty state. Header fields other than
/// `excludes` are not checked. A header that is not YAML at all is a
/// `Format` error, so nothing gets rewritten over it.
pub fn read_tree_state(root: &Path) -> arbor_core::Result<TreeState> {
    let tree_path = root.join(TREE_FILE);
    let content = match fs::read_to_string(&tree_path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(TreeState::default()),
        Err(e) => return Err(ArborError::io(&tree_path, e)),
    };

    match parse_document::<PersistedExcludes>(&content) {
        Ok(Some(doc)) => Ok(TreeState {
            exclusions: ExclusionSet::new(doc.meta.excludes),
            body: Some(doc.body),
        }),
        Ok(None) => {
            debug!("No header in {}, keeping its text as the body", tree_path.display());
            Ok(TreeState {
                exclusions: ExclusionSet::default(),
                body: Some(content),
            })
        }
        Err(e) => Err(ArborError::Format(format!(
            "{} header is not valid YAML: {e}",
            tree_path.display()
        ))),
    }
}

pub struct TreeBuilder<'a> {
    config: &'a TreeConfig,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(config: &'a TreeConfig) -> Self {
        Self { config }
    }

    /// Directory filter the validator must share to agree on scope.
    pub fn filter(&self, exclusions: ExclusionSet) -> DirFilter {
        DirFilter::new(&self.config.ignored_dirs, exclusions)
    }

    pub fn is_shallow(&self, name: &str) -> bool {
        self.config.shallow_dirs.iter().any(|d| d == name)
    }

    /// Build the tree and persist it into `<root>/codetree.md`.
    pub fn execute(&self, root: &Path) -> Result<TreeMeta> {
        let tree_path = root.join(TREE_FILE);
        let state = read_tree_state(root)
            .with_context(|| format!("refusing to rewrite {}", tree_path.display()))?;
        let body = state
            .body
            .unwrap_or_else(|| self.config.header_template.clone());
        let exclusions = state.exclusions;

        let filter = self.filter(exclusions);
        let root_component = self
            .build(root, &filter)
            .with_context(|| format!("failed to build tree for {}", root.display()))?;

        let meta = TreeMeta {
            version: METADATA_VERSION.to_string(),
            root: true,
            components: root_component.children,
            verification: Verification {
                scan_time: Utc::now(),
            },
            excludes: filter.exclusions().clone().into_vec(),
        };

        Document::new(meta.clone(), body)
            .write(&tree_path)
            .with_context(|| format!("failed to write {}", tree_path.display()))?;

        info!("Synced {} ({} top-level components)", tree_path.display(), meta.components.len());
        Ok(meta)
    }

    /// Build the component for `root` itself, recursing through its children.
    pub fn build(&self, root: &Path, filter: &DirFilter) -> arbor_core::Result<Component> {
        self.build_component(root, root, filter)
    }

    fn build_component(
        &self,
        root: &Path,
        current: &Path,
        filter: &DirFilter,
    ) -> arbor_core::Result<Component> {
        let rel = relative_path(root, current);
        let mut component = Component {
            name: dir_name(current),
            component_type: self.config.default_component,
            path: format!("./{rel}"),
            description: String::new(),
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            has_spec: false,
            has_model: current.join(MODEL_FILE).is_file(),
            is_valid: true,
            children: Vec::new(),
        };
        self.apply_spec(current, &mut component);

        let meta = fs::metadata(current).map_err(|e| ArborError::io(current, e))?;
        let mut latest = meta.modified().map(DateTime::<Utc>::from).ok();

        let mut entries = match fs::read_dir(current) {
            Ok(entries) => entries.filter_map(|e| e.ok()).collect::<Vec<_>>(),
            Err(e) => {
                warn!("Cannot read directory {}: {}", current.display(), e);
                Vec::new()
            }
        };
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let entry_meta = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    debug!("Cannot stat {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            let modified = entry_meta.modified().map(DateTime::<Utc>::from).ok();
            latest = latest.max(modified);

            if !entry_meta.is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let path = entry.path();
            let child_rel = relative_path(root, &path);
            if filter.skips(&name, &child_rel) {
                debug!("Skipping {}", child_rel);
                continue;
            }

            if self.is_shallow(&name) {
                component.children.push(Component {
                    name,
                    component_type: self.config.dependency_type,
                    path: format!("./{child_rel}"),
                    description: DEPENDENCY_DESCRIPTION.to_string(),
                    last_modified: modified.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                    has_spec: false,
                    has_model: false,
                    is_valid: true,
                    children: Vec::new(),
                });
                continue;
            }

            component.children.push(self.build_component(root, &path, filter)?);
        }

        component.last_modified = latest.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Ok(component)
    }

    fn apply_spec(&self, dir: &Path, component: &mut Component) {
        let spec_path = dir.join(SPEC_FILE);
        if !spec_path.is_file() {
            component.description = self.config.fallback_description.clone();
            return;
        }
        component.has_spec = true;

        let spec = match read_document::<SpecMeta>(&spec_path) {
            Ok(Some(doc)) => doc.meta,
            Ok(None) => {
                warn!("{} has no header block", spec_path.display());
                component.is_valid = false;
                return;
            }
            Err(e) => {
                warn!("Malformed {}: {}", spec_path.display(), e);
                component.is_valid = false;
                return;
            }
        };

        if !spec.component_type.trim().is_empty() {
            match spec.component_type.parse::<ComponentType>() {
                Ok(kind) => component.component_type = kind,
                Err(e) => debug!("{} in {}", e, spec_path.display()),
            }
        }
        component.description = spec.description().to_string();
        component.is_valid = spec.is_complete();
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
