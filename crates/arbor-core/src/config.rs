//! Layered configuration
//!
//! Built-in defaults are overridden by `~/.arbor/config.yaml`, which is in turn
//! overridden by `<project>/.arbor.yaml`. Layers are partial YAML documents
//! merged mapping-by-mapping; scalars and sequences are replaced wholesale.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::error::{ArborError, Result};
use crate::model::ComponentType;

pub const GLOBAL_CONFIG_DIR: &str = ".arbor";
pub const GLOBAL_CONFIG_FILE: &str = "config.yaml";
pub const PROJECT_CONFIG_FILE: &str = ".arbor.yaml";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ArborConfig {
    pub scope: ScopeConfig,
    pub parsing: ParsingConfig,
    pub sync: SyncConfig,
    pub validation: ValidationConfig,
    pub scaffold: ScaffoldConfig,
    pub agent: AgentConfig,
}

/// In-scope file set for hashing and extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub ignored_dirs: Vec<String>,
    pub ignored_files: Vec<String>,
    pub exclude_hidden: bool,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        ScopeConfig {
            ignored_dirs: strings(&[
                "node_modules",
                "vendor",
                "bower_components",
                "__pycache__",
                ".venv",
                ".git",
                ".idea",
                ".vscode",
                "target",
            ]),
            ignored_files: strings(&["*.lock", "*.sum", "*.log", "*.tmp"]),
            exclude_hidden: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    pub skip_tests: bool,
    pub ctags_binary: String,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        ParsingConfig {
            skip_tests: true,
            ctags_binary: "ctags".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    pub model: ModelSyncConfig,
    pub tree: TreeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSyncConfig {
    /// Hash written by scaffolding; a model carrying it has never been synced.
    pub first_sync_hash: String,
    pub algorithm: String,
}

impl Default for ModelSyncConfig {
    fn default() -> Self {
        ModelSyncConfig {
            first_sync_hash: "pending".to_string(),
            algorithm: "sha256".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Exact directory names never shown in the tree.
    pub ignored_dirs: Vec<String>,
    /// Directory names rendered as childless dependency nodes.
    pub shallow_dirs: Vec<String>,
    pub default_component: ComponentType,
    pub dependency_type: ComponentType,
    pub fallback_description: String,
    pub header_template: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            ignored_dirs: strings(&["target", "dist", "build", "__pycache__", "bower_components"]),
            shallow_dirs: strings(&["vendor", "node_modules", "third_party"]),
            default_component: ComponentType::Module,
            dependency_type: ComponentType::Dependency,
            fallback_description: "No description available".to_string(),
            header_template: "\n# Project Tree\n\nGenerated by arbor. Edit codespec.md files to change descriptions.\n"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Files required at the project root.
    pub mandatory_files: Vec<String>,
    /// Files required in every significant directory.
    pub module_files: Vec<String>,
    pub forbidden_strings: Vec<String>,
    pub required_spec_keys: Vec<String>,
    pub freshness: FreshnessConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            mandatory_files: Vec::new(),
            module_files: strings(&[crate::SPEC_FILE, crate::MODEL_FILE]),
            forbidden_strings: strings(&["TODO: fill", "<placeholder>"]),
            required_spec_keys: strings(&["title:", "type:"]),
            freshness: FreshnessConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    pub watched_extensions: Vec<String>,
    pub ignored_extensions: Vec<String>,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        FreshnessConfig {
            watched_extensions: strings(&[
                ".go", ".rs", ".py", ".js", ".ts", ".tsx", ".java", ".c", ".h", ".cpp", ".rb",
            ]),
            ignored_extensions: strings(&["_test.go", ".d.ts"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// Require title, summary and context when scaffolding.
    pub required_context: bool,
    pub default_type: ComponentType,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        ScaffoldConfig {
            required_context: false,
            default_type: ComponentType::Module,
        }
    }
}

/// Agent assets installed into projects by `init-agent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Source tree, relative to the home directory unless absolute.
    pub assets_dir: String,
    /// Destination inside the project root.
    pub target_dir: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            assets_dir: ".arbor/agent".to_string(),
            target_dir: ".agent".to_string(),
        }
    }
}

impl AgentConfig {
    pub fn assets_path(&self) -> Option<PathBuf> {
        let assets = Path::new(&self.assets_dir);
        if assets.is_absolute() {
            return Some(assets.to_path_buf());
        }
        dirs::home_dir().map(|home| home.join(assets))
    }
}

impl FreshnessConfig {
    /// Watched by extension suffix and not carved out by an ignored suffix.
    pub fn is_watched(&self, name: &str) -> bool {
        self.watched_extensions.iter().any(|ext| name.ends_with(ext.as_str()))
            && !self.ignored_extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    pub fn has_watched_extension(&self, name: &str) -> bool {
        self.watched_extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

impl ArborConfig {
    /// Defaults, then the global file, then the project file (when a root is given).
    pub fn load(project_root: Option<&Path>) -> Result<Self> {
        let mut layered = Self::default_value()?;

        if let Some(global) = Self::global_path() {
            merge_file(&mut layered, &global)?;
        }
        if let Some(root) = project_root {
            merge_file(&mut layered, &root.join(PROJECT_CONFIG_FILE))?;
        }

        Self::from_value(layered)
    }

    /// Defaults overridden by one explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ArborError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let mut layered = Self::default_value()?;
        merge_file(&mut layered, path)?;
        Self::from_value(layered)
    }

    /// Re-apply only the project layer over an already loaded configuration.
    pub fn load_for_project(&self, project_root: &Path) -> Result<Self> {
        let mut layered = serde_yaml::to_value(self)?;
        merge_file(&mut layered, &project_root.join(PROJECT_CONFIG_FILE))?;
        Self::from_value(layered)
    }

    pub fn global_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
    }

    fn default_value() -> Result<Value> {
        Ok(serde_yaml::to_value(ArborConfig::default())?)
    }

    fn from_value(value: Value) -> Result<Self> {
        serde_yaml::from_value(value).map_err(|e| ArborError::Config(e.to_string()))
    }
}

fn merge_file(base: &mut Value, path: &Path) -> Result<()> {
    if !path.is_file() {
        return Ok(());
    }
    let content = fs::read_to_string(path).map_err(|e| ArborError::io(path, e))?;
    let overlay: Value = serde_yaml::from_str(&content)
        .map_err(|e| ArborError::Config(format!("{}: {e}", path.display())))?;
    debug!("Merging config layer {}", path.display());
    merge_values(base, overlay);
    Ok(())
}

/// Deep-merge mappings; anything else replaces. Null overlays are ignored.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
