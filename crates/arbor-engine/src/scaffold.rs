//! Module scaffolding

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arbor_core::{
    ArborConfig, ComponentType, Document, Integrity, METADATA_VERSION, MODEL_FILE, ModelMeta,
    SPEC_FILE, SpecMeta,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::sync::MODEL_BODY;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldParams {
    /// Parent directory of the new module.
    pub path: String,
    /// Module directory name, or `.` to scaffold `path` itself.
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: Option<String>,
    pub title: String,
    pub summary: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldResult {
    pub module: String,
    pub target_dir: String,
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Create the module directory and its two metadata documents. Existing files are kept.
pub fn scaffold(parent: &Path, params: &ScaffoldParams, config: &ArborConfig) -> Result<ScaffoldResult> {
    let (target_dir, module): (PathBuf, String) = if params.name.is_empty() || params.name == "." {
        let module = parent
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| parent.display().to_string());
        (parent.to_path_buf(), module)
    } else {
        (parent.join(&params.name), params.name.clone())
    };

    if config.scaffold.required_context
        && (params.title.trim().is_empty()
            || params.summary.trim().is_empty()
            || params.context.trim().is_empty())
    {
        bail!("title, summary and context are required for scaffolding");
    }

    let component_type = match params.component_type.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw
            .parse::<ComponentType>()
            .map_err(|e| anyhow::anyhow!(e))?,
        _ => config.scaffold.default_type,
    };

    fs::create_dir_all(&target_dir)
        .with_context(|| format!("failed to create {}", target_dir.display()))?;

    let title = if params.title.trim().is_empty() {
        module.clone()
    } else {
        params.title.clone()
    };
    let spec = Document::new(
        SpecMeta {
            version: METADATA_VERSION.to_string(),
            id: module.clone(),
            component_type: component_type.to_string(),
            title: title.clone(),
            summary: params.summary.clone(),
            ..Default::default()
        },
        spec_body(&title, &params.context),
    );

    let now = Utc::now();
    let model = Document::new(
        ModelMeta {
            version: METADATA_VERSION.to_string(),
            integrity: Integrity {
                src_hash: config.sync.model.first_sync_hash.clone(),
                algorithm: config.sync.model.algorithm.clone(),
                last_modified: now,
                checked_at: now,
            },
            symbols: Vec::new(),
        },
        MODEL_BODY,
    );

    let mut created = Vec::new();
    let mut skipped = Vec::new();

    for (name, content) in [(SPEC_FILE, spec.render()?), (MODEL_FILE, model.render()?)] {
        let path = target_dir.join(name);
        if path.exists() {
            debug!("Keeping existing {}", path.display());
            skipped.push(name.to_string());
            continue;
        }
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        created.push(name.to_string());
    }

    info!("Scaffolded {} in {}", module, target_dir.display());
    Ok(ScaffoldResult {
        module,
        target_dir: target_dir.display().to_string(),
        created,
        skipped,
    })
}

fn spec_body(title: &str, context: &str) -> String {
    let mut body = format!("\n# {title}\n");
    if !context.trim().is_empty() {
        body.push_str("\n## Context\n\n");
        body.push_str(context.trim());
        body.push('\n');
    }
    body
}
