//! Persisted Markdown documents with a YAML header block
//!
//! Every document starts with a line that is exactly `---`, followed by the
//! YAML header, followed by another `---` line. Whatever comes after the
//! closing delimiter is free-form and is carried through rewrites untouched.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ArborError, Result};
use crate::model::{Component, Integrity, Symbol};

/// A parsed document: typed header plus verbatim body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<T> {
    pub meta: T,
    pub body: String,
}

impl<T: Serialize> Document<T> {
    pub fn new(meta: T, body: impl Into<String>) -> Self {
        Document {
            meta,
            body: body.into(),
        }
    }

    /// Serialize back into `---\n<yaml>---\n<body>` form.
    pub fn render(&self) -> Result<String> {
        render_document(&self.meta, &self.body)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let content = self.render()?;
        fs::write(path, content).map_err(|e| ArborError::io(path, e))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// A declared dependency in a module intent document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpecDependency {
    pub module: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Requirement {
    pub id: String,
    pub desc: String,
    pub priority: String,
}

/// Header of `codespec.md`, the module intent document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SpecMeta {
    pub version: String,
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub title: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<SpecDependency>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<Requirement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<String>,
}

impl SpecMeta {
    /// Title and type are the two fields a spec cannot omit.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.component_type.trim().is_empty()
    }

    /// Summary if present, else the title.
    pub fn description(&self) -> &str {
        if self.summary.trim().is_empty() {
            &self.title
        } else {
            &self.summary
        }
    }
}

/// Header of `codemodel.md`, the module structure document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModelMeta {
    pub version: String,
    pub integrity: Integrity,
    pub symbols: Vec<Symbol>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub scan_time: DateTime<Utc>,
}

impl Default for Verification {
    fn default() -> Self {
        Verification {
            scan_time: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Header of `codetree.md`, the project hierarchy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TreeMeta {
    pub version: String,
    pub root: bool,
    pub components: Vec<Component>,
    pub verification: Verification,
    pub excludes: Vec<String>,
}

/// Split content into `(header, body)`.
///
/// Returns `None` when the first line is not `---` or no closing `---` line follows.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse a document. Missing delimiters degrade to `Ok(None)`; a present but
/// malformed header is an error.
pub fn parse_document<T>(content: &str) -> Result<Option<Document<T>>>
where
    T: DeserializeOwned + Default,
{
    let Some((header, body)) = split_frontmatter(content) else {
        return Ok(None);
    };

    let meta = if header.trim().is_empty() {
        T::default()
    } else {
        serde_yaml::from_str(header)?
    };

    Ok(Some(Document {
        meta,
        body: body.to_string(),
    }))
}

/// Read and parse a document from disk. A missing file or missing delimiters yield `Ok(None)`.
pub fn read_document<T>(path: &Path) -> Result<Option<Document<T>>>
where
    T: DeserializeOwned + Default,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ArborError::io(path, e)),
    };

    let parsed = parse_document(&content)?;
    if parsed.is_none() {
        debug!("No header delimiters in {}", path.display());
    }
    Ok(parsed)
}

/// Render a header and body into document text.
pub fn render_document<T: Serialize>(meta: &T, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(meta)?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str("---\n");
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n");
    out.push_str(body);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_requires_leading_delimiter() {
        assert!(split_frontmatter("title: x\n---\n").is_none());
        assert!(split_frontmatter("---\ntitle: x\n").is_none());
    }

    #[test]
    fn split_keeps_body_verbatim() {
        let (header, body) = split_frontmatter("---\na: 1\n---\n# Notes\n\n--- not a delimiter\n").unwrap();
        assert_eq!(header, "a: 1\n");
        assert_eq!(body, "# Notes\n\n--- not a delimiter\n");
    }

    #[test]
    fn rewrite_preserves_body() {
        let content = "---\ntitle: Old\ntype: module\n---\nHand written notes.\n";
        let mut doc: Document<SpecMeta> = parse_document(content).unwrap().unwrap();
        doc.meta.title = "New".to_string();

        let rendered = doc.render().unwrap();
        assert!(rendered.ends_with("---\nHand written notes.\n"));

        let again: Document<SpecMeta> = parse_document(&rendered).unwrap().unwrap();
        assert_eq!(again.meta.title, "New");
        assert_eq!(again.body, "Hand written notes.\n");
    }

    #[test]
    fn malformed_header_is_error() {
        let result: Result<Option<Document<SpecMeta>>> = parse_document("---\ntitle: [unclosed\n---\n");
        assert!(result.is_err());
    }

    #[test]
    fn spec_description_falls_back_to_title() {
        let spec = SpecMeta {
            title: "Payments".into(),
            ..Default::default()
        };
        assert_eq!(spec.description(), "Payments");
        assert!(!spec.is_complete());
    }
}
