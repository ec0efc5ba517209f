//! Error taxonomy shared by the core and indexer crates

use std::path::PathBuf;

/// Convenience alias used throughout the library crates.
pub type Result<T> = std::result::Result<T, ArborError>;

/// Failure classes raised while reading, hashing or extracting metadata.
#[derive(Debug, thiserror::Error)]
pub enum ArborError {
    /// Root unreadable, or a read failed while streaming content.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory walk itself failed.
    #[error("failed to walk {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },

    /// An external tool is not installed. Callers may degrade instead of aborting.
    #[error("tool not available: {0}")]
    ToolUnavailable(String),

    /// An external tool ran but failed.
    #[error("tool failed: {0}")]
    Tool(String),

    /// A single source file could not be parsed.
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A persisted document is missing its header delimiters.
    #[error("invalid document format: {0}")]
    Format(String),

    /// A caller-supplied path was rejected.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArborError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArborError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures that only degrade an optional strategy.
    pub fn is_soft(&self) -> bool {
        matches!(self, ArborError::ToolUnavailable(_) | ArborError::Tool(_))
    }
}
