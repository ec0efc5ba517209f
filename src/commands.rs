//! CLI command implementations

use std::io;
use std::path::Path;

use anyhow::Context;
use arbor_core::ArborConfig;
use arbor_engine::{Engine, ExclusionAction, ScaffoldParams};
use arbor_server::Server;
use serde::Serialize;

/// Build the engine from the layered configuration, or from one explicit file.
pub fn engine(config_path: Option<&Path>) -> anyhow::Result<Engine> {
    let config = match config_path {
        Some(path) => ArborConfig::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ArborConfig::load(None).context("failed to load config")?,
    };
    Engine::new(config)
}

pub fn serve(engine: Engine) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Server::new(engine).serve(stdin.lock(), stdout.lock())
}

pub fn hash(engine: &Engine, path: &str) -> anyhow::Result<()> {
    print_json(&engine.hash(&resolve(path)?)?)
}

pub fn symbols(engine: &Engine, path: &str) -> anyhow::Result<()> {
    let symbols = engine.symbols(&resolve(path)?)?;
    tracing::info!("Extracted {} symbols", symbols.len());
    print_json(&symbols)
}

pub fn tree(engine: &Engine, path: &str) -> anyhow::Result<()> {
    print_json(&engine.sync_tree(&resolve(path)?)?)
}

pub fn status(engine: &Engine, path: &str) -> anyhow::Result<()> {
    print_json(&engine.query_context(&resolve(path)?)?)
}

/// Prints the report and returns whether the project is valid.
pub fn validate(engine: &Engine, path: &str) -> anyhow::Result<bool> {
    let report = engine.validate(&resolve(path)?)?;
    print_json(&report)?;
    Ok(report.is_valid)
}

pub fn sync(engine: &Engine, path: &str) -> anyhow::Result<()> {
    print_json(&engine.sync_model(&resolve(path)?)?)
}

pub fn body(engine: &Engine, path: &str, symbol: &str) -> anyhow::Result<()> {
    let info = engine.function_info(&resolve(path)?, symbol)?;
    println!("{}", info.code);
    Ok(())
}

pub fn exclude(engine: &Engine, root: &str, action: &str, target: &str) -> anyhow::Result<()> {
    let action: ExclusionAction = action.parse()?;
    print_json(&engine.manage_exclusions(&resolve(root)?, target, action)?)
}

pub fn scaffold(engine: &Engine, mut params: ScaffoldParams) -> anyhow::Result<()> {
    params.path = resolve(&params.path)?;
    print_json(&engine.scaffold(&params)?)
}

pub fn init_agent(engine: &Engine, path: &str) -> anyhow::Result<()> {
    print_json(&engine.init_agent(&resolve(path)?)?)
}

pub fn init_project(
    engine: &Engine,
    path: &str,
    code_path: &str,
    params: ScaffoldParams,
) -> anyhow::Result<()> {
    let code_path = match code_path.trim() {
        "" | "." => ".".to_string(),
        raw => resolve(raw)?,
    };
    print_json(&engine.init_project(&resolve(path)?, &code_path, &params)?)
}

/// Anchor relative command-line paths at the working directory.
fn resolve(path: &str) -> anyhow::Result<String> {
    if path.starts_with('~') || Path::new(path).is_absolute() {
        return Ok(path.to_string());
    }
    let absolute = std::path::absolute(path)
        .with_context(|| format!("cannot resolve path {path}"))?;
    Ok(absolute.display().to_string())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}
