//! Arbor Core: metadata model, persisted documents, scope rules and configuration

pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod scope;

#[cfg(test)]
pub mod tests;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{
    AgentConfig, ArborConfig, FreshnessConfig, ModelSyncConfig, ParsingConfig, ScaffoldConfig,
    ScopeConfig, SyncConfig, TreeConfig, ValidationConfig,
};
pub use document::{
    Document, ModelMeta, Requirement, SpecDependency, SpecMeta, TreeMeta, Verification,
    parse_document, read_document, render_document, split_frontmatter,
};
pub use error::{ArborError, Result};
pub use model::{
    Component, ComponentType, Freshness, FreshnessStatus, Integrity, Symbol, SymbolKind,
};
pub use scope::{
    DirFilter, ExclusionSet, IgnoreRules, has_boundary_marker, is_hidden, is_metadata_file,
    relative_path,
};

/// Version stamp written into every persisted header.
pub const METADATA_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Module intent document; also a boundary marker.
pub const SPEC_FILE: &str = "codespec.md";

/// Module structure document; also a boundary marker.
pub const MODEL_FILE: &str = "codemodel.md";

/// Project hierarchy document, written at the tree root.
pub const TREE_FILE: &str = "codetree.md";
