//! Documentation freshness, recomputed from disk on every call

use std::path::Path;

use arbor_core::{Freshness, FreshnessStatus, ModelMeta};
use arbor_indexer::ContentHasher;

pub struct FreshnessEvaluator<'a> {
    hasher: &'a ContentHasher,
    first_sync_hash: &'a str,
}

impl<'a> FreshnessEvaluator<'a> {
    pub fn new(hasher: &'a ContentHasher, first_sync_hash: &'a str) -> Self {
        Self {
            hasher,
            first_sync_hash,
        }
    }

    /// Classify `dir` against its persisted model, if any.
    pub fn evaluate(&self, dir: &Path, model: Option<&ModelMeta>) -> Freshness {
        let Some(model) = model else {
            return Freshness::unknown(format!("No {} found", arbor_core::MODEL_FILE));
        };

        let current = match self.hasher.hash_dir(dir) {
            Ok(hash) => hash,
            Err(e) => return Freshness::unknown(format!("Hashing failed: {e}")),
        };
        let stored = model.integrity.src_hash.clone();

        let (status, reason) = if stored == self.first_sync_hash {
            (FreshnessStatus::Stale, "New module, never synced")
        } else if stored != current {
            (FreshnessStatus::Stale, "Source code changed")
        } else {
            (FreshnessStatus::Fresh, "")
        };

        Freshness {
            status,
            reason: reason.to_string(),
            doc_hash: Some(stored),
            current_hash: Some(current),
        }
    }
}
