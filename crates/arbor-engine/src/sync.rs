//! Model synchronisation: extract symbols, hash the module, persist both

use std::path::Path;

use anyhow::{Context, Result};
use arbor_core::{
    Document, Integrity, METADATA_VERSION, MODEL_FILE, ModelMeta, read_document,
};
use arbor_indexer::{ContentHasher, PolyglotParser, SymbolExtractor};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const MODEL_BODY: &str = "\n# Code Model\n\nGenerated by arbor. Do not edit the header by hand.\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub path: String,
    pub status: SyncStatus,
    pub symbol_count: usize,
    pub src_hash: String,
}

pub struct ModelSync<'a> {
    parser: &'a PolyglotParser,
    hasher: &'a ContentHasher,
    algorithm: &'a str,
}

impl<'a> ModelSync<'a> {
    pub fn new(parser: &'a PolyglotParser, hasher: &'a ContentHasher, algorithm: &'a str) -> Self {
        Self {
            parser,
            hasher,
            algorithm,
        }
    }

    pub fn execute(&self, dir: &Path) -> Result<SyncResult> {
        let symbols = self
            .parser
            .parse_dir(dir)
            .with_context(|| format!("failed to extract symbols from {}", dir.display()))?;
        let digest = self
            .hasher
            .digest(dir)
            .with_context(|| format!("failed to hash {}", dir.display()))?;

        let model_path = dir.join(MODEL_FILE);
        let existing = match read_document::<ModelMeta>(&model_path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Rewriting malformed {}: {}", model_path.display(), e);
                None
            }
        };

        let status = match &existing {
            Some(doc) if doc.meta.integrity.src_hash == digest.hash => SyncStatus::Unchanged,
            _ => SyncStatus::Updated,
        };
        let body = existing
            .map(|doc| doc.body)
            .unwrap_or_else(|| MODEL_BODY.to_string());

        let now = Utc::now();
        let symbol_count = symbols.len();
        let meta = ModelMeta {
            version: METADATA_VERSION.to_string(),
            integrity: Integrity {
                src_hash: digest.hash.clone(),
                algorithm: self.algorithm.to_string(),
                last_modified: digest.latest_modified.unwrap_or(now),
                checked_at: now,
            },
            symbols,
        };

        Document::new(meta, body)
            .write(&model_path)
            .with_context(|| format!("failed to write {}", model_path.display()))?;

        info!(
            "Synced {} ({} symbols, {:?})",
            model_path.display(),
            symbol_count,
            status
        );
        Ok(SyncResult {
            path: dir.display().to_string(),
            status,
            symbol_count,
            src_hash: digest.hash,
        })
    }
}
