//! Deterministic content hashing of a module directory
//!
//! The digest covers the sorted in-scope file set: for every file, its
//! relative path bytes and then its content bytes are fed into one running
//! SHA-256. Nested modules are opaque, so a parent hash never moves when only
//! a child module's contents change.

use std::fs::File;
use std::io;
use std::path::Path;

use arbor_core::{ArborError, IgnoreRules, Result, ScopeConfig};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::walker::{ScopedFile, collect_scoped_files};

pub const ALGORITHM: &str = "sha256";

/// Outcome of hashing a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirDigest {
    pub hash: String,
    pub file_count: usize,
    /// Newest modification time among the hashed files.
    pub latest_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ContentHasher {
    rules: IgnoreRules,
}

impl ContentHasher {
    pub fn new(scope: &ScopeConfig) -> Result<Self> {
        Ok(Self {
            rules: IgnoreRules::new(scope)?,
        })
    }

    pub fn with_rules(rules: IgnoreRules) -> Self {
        Self { rules }
    }

    /// Hex digest of the directory's in-scope content.
    pub fn hash_dir(&self, root: &Path) -> Result<String> {
        Ok(self.digest(root)?.hash)
    }

    pub fn digest(&self, root: &Path) -> Result<DirDigest> {
        let files = collect_scoped_files(root, &self.rules)?;
        hash_files(&files)
    }
}

/// Hash an already sorted file list.
///
/// Files that cannot be opened are skipped. A read failure after opening
/// aborts the whole computation.
pub fn hash_files(files: &[ScopedFile]) -> Result<DirDigest> {
    let mut hasher = Sha256::new();
    let mut file_count = 0;
    let mut latest: Option<DateTime<Utc>> = None;

    for file in files {
        let mut handle = match File::open(&file.abs) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", file.abs.display(), e);
                continue;
            }
        };

        hasher.update(file.rel.as_bytes());
        io::copy(&mut handle, &mut hasher).map_err(|e| ArborError::io(&file.abs, e))?;
        file_count += 1;

        if let Ok(modified) = handle.metadata().and_then(|m| m.modified()) {
            let modified = DateTime::<Utc>::from(modified);
            latest = Some(latest.map_or(modified, |l| l.max(modified)));
        }
    }

    let hash = format!("{:x}", hasher.finalize());
    debug!("Hashed {} files -> {}", file_count, hash);

    Ok(DirDigest {
        hash,
        file_count,
        latest_modified: latest,
    })
}
