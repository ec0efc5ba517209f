//! Core data structures for module metadata

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminates what kind of declaration a symbol represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Method,
    Struct,
    Interface,
    Type,
    Other,
}

impl SymbolKind {
    /// Map a free-form kind label (as emitted by tagging tools) onto the closed set.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "function" | "func" | "subroutine" | "procedure" => SymbolKind::Function,
            "method" | "member" | "singletonmethod" => SymbolKind::Method,
            "struct" | "class" | "record" => SymbolKind::Struct,
            "interface" | "trait" | "protocol" => SymbolKind::Interface,
            "type" | "typedef" | "alias" | "enum" | "union" => SymbolKind::Type,
            _ => SymbolKind::Other,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Struct => "struct",
            SymbolKind::Interface => "interface",
            SymbolKind::Type => "type",
            SymbolKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// A declared symbol found in a module directory.
///
/// Symbols are produced fresh by every extraction call. Lines are 1-based and
/// `line_end >= line`. `file_path` is relative to the directory that was parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub exported: bool,
    pub line: usize,
    pub line_end: usize,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Integrity record stored in a module's structure document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integrity {
    pub src_hash: String,
    pub algorithm: String,
    pub last_modified: DateTime<Utc>,
    pub checked_at: DateTime<Utc>,
}

impl Default for Integrity {
    fn default() -> Self {
        Integrity {
            src_hash: String::new(),
            algorithm: String::new(),
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            checked_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Declared role of a component in the project tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    #[default]
    Module,
    Library,
    Service,
    App,
    Dependency,
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "module" => Ok(ComponentType::Module),
            "library" | "lib" => Ok(ComponentType::Library),
            "service" => Ok(ComponentType::Service),
            "app" | "application" => Ok(ComponentType::App),
            "dependency" => Ok(ComponentType::Dependency),
            other => Err(format!("unknown component type '{other}'")),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComponentType::Module => "module",
            ComponentType::Library => "library",
            ComponentType::Service => "service",
            ComponentType::App => "app",
            ComponentType::Dependency => "dependency",
        };
        f.write_str(label)
    }
}

/// A node of the project component tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Path relative to the tree root, always starting with `./`.
    pub path: String,
    #[serde(default)]
    pub description: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub has_spec: bool,
    #[serde(default)]
    pub has_model: bool,
    #[serde(default = "default_true")]
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Component>,
}

fn default_true() -> bool {
    true
}

impl Component {
    /// True if this component or any descendant failed the structural check.
    pub fn has_invalid(&self) -> bool {
        !self.is_valid || self.children.iter().any(Component::has_invalid)
    }
}

/// Three-state documentation freshness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessStatus {
    #[default]
    Unknown,
    Fresh,
    Stale,
}

/// Result of comparing a persisted hash against a freshly computed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Freshness {
    pub status: FreshnessStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hash: Option<String>,
}

impl Freshness {
    pub fn unknown(reason: impl Into<String>) -> Self {
        Freshness {
            status: FreshnessStatus::Unknown,
            reason: reason.into(),
            doc_hash: None,
            current_hash: None,
        }
    }
}
