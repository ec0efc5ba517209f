//! Symbol lookup with source body

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use arbor_core::{ArborError, Symbol};
use arbor_indexer::get_symbol_body;
use serde::{Deserialize, Serialize};

use crate::context::ModuleContext;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub symbol: Symbol,
    pub code: String,
    pub context: ModuleContext,
}

/// Find `name` in the module's persisted model and return its body.
pub fn function_info(dir: &Path, name: &str, context: ModuleContext) -> Result<FunctionInfo> {
    let model = context.model.as_ref().ok_or_else(|| {
        anyhow!(ArborError::NotFound(format!(
            "no {} in {}, sync the module first",
            arbor_core::MODEL_FILE,
            dir.display()
        )))
    })?;

    let symbol = model
        .symbols
        .iter()
        .find(|s| s.name == name)
        .cloned()
        .ok_or_else(|| {
            anyhow!(ArborError::NotFound(format!(
                "symbol {name} not found in module {}",
                dir.display()
            )))
        })?;

    let code = get_symbol_body(dir, &symbol).context("failed to extract symbol body")?;

    Ok(FunctionInfo {
        symbol,
        code,
        context,
    })
}
