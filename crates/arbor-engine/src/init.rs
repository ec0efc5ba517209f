//! Project and agent initialisation

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arbor_core::{AgentConfig, ArborConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::scaffold::{self, ScaffoldParams, ScaffoldResult};
use crate::tree::TreeBuilder;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentInitResult {
    pub source: String,
    pub target_dir: String,
    /// Paths relative to `target_dir`, in copy order.
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInitResult {
    pub project: String,
    pub code_root: String,
    pub agent: Option<AgentInitResult>,
    pub components: usize,
    pub scaffold: Option<ScaffoldResult>,
    pub warnings: Vec<String>,
}

/// Copy the agent asset tree into `<project>/<target_dir>`, keeping files that already exist.
pub fn init_agent(project: &Path, agent: &AgentConfig) -> Result<AgentInitResult> {
    let Some(source) = agent.assets_path() else {
        bail!("cannot resolve the home directory holding agent assets");
    };
    if !source.is_dir() {
        bail!(
            "agent assets not found at {}, install them first",
            source.display()
        );
    }
    let target = project.join(&agent.target_dir);

    let mut result = AgentInitResult {
        source: source.display().to_string(),
        target_dir: target.display().to_string(),
        created: Vec::new(),
        skipped: Vec::new(),
    };
    copy_tree(&source, &target, "", &mut result)?;

    info!(
        "Installed {} agent files into {} ({} kept)",
        result.created.len(),
        target.display(),
        result.skipped.len()
    );
    Ok(result)
}

fn copy_tree(source: &Path, target: &Path, prefix: &str, result: &mut AgentInitResult) -> Result<()> {
    fs::create_dir_all(target).with_context(|| format!("failed to create {}", target.display()))?;

    let mut entries = fs::read_dir(source)
        .with_context(|| format!("failed to read {}", source.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("failed to read {}", source.display()))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name().to_string_lossy().to_string();
        let rel = format!("{prefix}{name}");
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", entry.path().display()))?;
        let dest = target.join(&name);

        if file_type.is_dir() {
            copy_tree(&entry.path(), &dest, &format!("{rel}/"), result)?;
        } else if !file_type.is_file() {
            debug!("Skipping non-regular asset {}", entry.path().display());
        } else if dest.exists() {
            debug!("Keeping existing {}", dest.display());
            result.skipped.push(rel);
        } else {
            fs::copy(entry.path(), &dest)
                .with_context(|| format!("failed to copy {}", entry.path().display()))?;
            result.created.push(rel);
        }
    }
    Ok(())
}

/// Install agent assets at the project root, build the tree at the code root
/// and make the code root a module of its own.
pub fn init_project(
    project: &Path,
    code_root: &Path,
    params: &ScaffoldParams,
    config: &ArborConfig,
) -> Result<ProjectInitResult> {
    let mut warnings = Vec::new();

    let agent = match init_agent(project, &config.agent) {
        Ok(agent) => Some(agent),
        Err(e) => {
            warn!("Agent assets not installed: {e:#}");
            warnings.push(format!("agent: {e:#}"));
            None
        }
    };

    let tree_config = config
        .load_for_project(code_root)
        .context("failed to load project configuration")?;
    let tree = TreeBuilder::new(&tree_config.sync.tree)
        .execute(code_root)
        .context("failed to sync codetree")?;

    let params = ScaffoldParams {
        path: code_root.display().to_string(),
        name: ".".to_string(),
        ..params.clone()
    };
    let scaffold = match scaffold::scaffold(code_root, &params, config) {
        Ok(result) => Some(result),
        Err(e) => {
            warn!("Scaffold of {} skipped: {e:#}", code_root.display());
            warnings.push(format!("scaffold: {e:#}"));
            None
        }
    };

    info!("Project anchored at {}", code_root.display());
    Ok(ProjectInitResult {
        project: project.display().to_string(),
        code_root: code_root.display().to_string(),
        agent,
        components: tree.components.len(),
        scaffold,
        warnings,
    })
}
