//! Module context query: intent, structure and freshness in one payload

use std::path::Path;

use arbor_core::{Freshness, MODEL_FILE, ModelMeta, SPEC_FILE, SpecMeta, read_document};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::freshness::FreshnessEvaluator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleContext {
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    pub spec: Option<SpecMeta>,
    pub model: Option<ModelMeta>,
    pub freshness: Freshness,
}

/// Unreadable or headerless documents read as absent.
fn read_or_absent<T>(path: &Path) -> Option<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match read_document::<T>(path) {
        Ok(doc) => doc.map(|d| d.meta),
        Err(e) => {
            warn!("Treating {} as absent: {}", path.display(), e);
            None
        }
    }
}

pub fn query_context(dir: &Path, evaluator: &FreshnessEvaluator<'_>) -> ModuleContext {
    let spec: Option<SpecMeta> = read_or_absent(&dir.join(SPEC_FILE));
    let model: Option<ModelMeta> = read_or_absent(&dir.join(MODEL_FILE));

    let freshness = evaluator.evaluate(dir, model.as_ref());

    // Docstrings are dropped from the payload; the source stays authoritative.
    let model = model.map(|mut m| {
        for symbol in &mut m.symbols {
            symbol.docstring = None;
        }
        m
    });

    ModuleContext {
        path: dir.display().to_string(),
        summary: spec.as_ref().map(|s| s.summary.clone()).unwrap_or_default(),
        spec,
        model,
        freshness,
    }
}
