//! Editing the persisted exclusion set of a project

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use arbor_core::{ArborError, ExclusionSet, TREE_FILE, TreeMeta, read_document};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::tree::TreeBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionAction {
    Add,
    Remove,
}

impl FromStr for ExclusionAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(ExclusionAction::Add),
            "remove" => Ok(ExclusionAction::Remove),
            other => bail!("unknown action '{other}': must be 'add' or 'remove'"),
        }
    }
}

impl fmt::Display for ExclusionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionAction::Add => f.write_str("add"),
            ExclusionAction::Remove => f.write_str("remove"),
        }
    }
}

/// Rewrite the `excludes` list, then rebuild the tree so it reflects the change.
pub fn manage_exclusions(
    root: &Path,
    target: &str,
    action: ExclusionAction,
    builder: &TreeBuilder<'_>,
) -> Result<TreeMeta> {
    let tree_path = root.join(TREE_FILE);
    if !tree_path.is_file() {
        bail!(ArborError::NotFound(format!(
            "{TREE_FILE} not found at {}, sync the tree first",
            root.display()
        )));
    }

    let mut doc = read_document::<TreeMeta>(&tree_path)
        .with_context(|| format!("failed to parse {}", tree_path.display()))?
        .ok_or_else(|| {
            anyhow!(ArborError::Format(format!(
                "{TREE_FILE} is missing its header delimiters"
            )))
        })?;

    let mut set = ExclusionSet::new(&doc.meta.excludes);
    let changed = match action {
        ExclusionAction::Add => set.insert(target),
        ExclusionAction::Remove => set.remove(target),
    };
    doc.meta.excludes = set.into_vec();
    doc.write(&tree_path)
        .with_context(|| format!("failed to write {}", tree_path.display()))?;

    info!("Exclusion {} '{}' (changed: {})", action, target, changed);

    builder
        .execute(root)
        .context("exclusions saved but failed to refresh tree")
}
