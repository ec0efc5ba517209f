//! Use cases over persisted module metadata
//!
//! Every entry point on [`Engine`] takes a caller-supplied path, applies the
//! path policy and runs one synchronous operation against the filesystem.

pub mod context;
pub mod exclusions;
pub mod freshness;
pub mod function_info;
pub mod init;
pub mod paths;
pub mod scaffold;
pub mod sync;
pub mod tree;
pub mod validate;


use anyhow::{Context, Result};
use arbor_core::{ArborConfig, Symbol, TreeMeta};
use arbor_indexer::{ContentHasher, DirDigest, PolyglotParser, SymbolExtractor};

pub use context::ModuleContext;
pub use exclusions::ExclusionAction;
pub use freshness::FreshnessEvaluator;
pub use function_info::FunctionInfo;
pub use init::{AgentInitResult, ProjectInitResult};
pub use paths::expand_path;
pub use scaffold::{ScaffoldParams, ScaffoldResult};
pub use sync::{SyncResult, SyncStatus};
pub use tree::TreeBuilder;
pub use validate::{Finding, ValidationReport, Validator};

/// Facade shared by the command line and the JSON-RPC server.
pub struct Engine {
    config: ArborConfig,
    hasher: ContentHasher,
    parser: PolyglotParser,
}

impl Engine {
    pub fn new(config: ArborConfig) -> Result<Self> {
        let hasher = ContentHasher::new(&config.scope).context("invalid scope configuration")?;
        let parser = PolyglotParser::new(&config).context("invalid scope configuration")?;
        Ok(Self {
            config,
            hasher,
            parser,
        })
    }

    pub fn config(&self) -> &ArborConfig {
        &self.config
    }

    pub fn hash(&self, path: &str) -> Result<DirDigest> {
        let dir = expand_path(path)?;
        Ok(self.hasher.digest(&dir)?)
    }

    pub fn symbols(&self, path: &str) -> Result<Vec<Symbol>> {
        let dir = expand_path(path)?;
        Ok(self.parser.parse_dir(&dir)?)
    }

    pub fn sync_model(&self, path: &str) -> Result<SyncResult> {
        let dir = expand_path(path)?;
        sync::ModelSync::new(&self.parser, &self.hasher, &self.config.sync.model.algorithm)
            .execute(&dir)
    }

    pub fn sync_tree(&self, path: &str) -> Result<TreeMeta> {
        let root = expand_path(path)?;
        let config = self.config.load_for_project(&root)?;
        TreeBuilder::new(&config.sync.tree).execute(&root)
    }

    pub fn query_context(&self, path: &str) -> Result<ModuleContext> {
        let dir = expand_path(path)?;
        Ok(context::query_context(&dir, &self.evaluator()))
    }

    pub fn function_info(&self, path: &str, symbol: &str) -> Result<FunctionInfo> {
        let dir = expand_path(path)?;
        let context = context::query_context(&dir, &self.evaluator());
        function_info::function_info(&dir, symbol, context)
    }

    pub fn validate(&self, path: &str) -> Result<ValidationReport> {
        let root = expand_path(path)?;
        Validator::new(self.config.clone()).execute(&root)
    }

    pub fn manage_exclusions(&self, path: &str, target: &str, action: ExclusionAction) -> Result<TreeMeta> {
        let root = expand_path(path)?;
        let config = self.config.load_for_project(&root)?;
        exclusions::manage_exclusions(&root, target, action, &TreeBuilder::new(&config.sync.tree))
    }

    pub fn scaffold(&self, params: &ScaffoldParams) -> Result<ScaffoldResult> {
        let parent = expand_path(&params.path)?;
        scaffold::scaffold(&parent, params, &self.config)
    }

    pub fn init_agent(&self, path: &str) -> Result<AgentInitResult> {
        let project = expand_path(path)?;
        init::init_agent(&project, &self.config.agent)
    }

    /// `code_path` empty or `.` anchors the tree at the project root itself.
    pub fn init_project(
        &self,
        path: &str,
        code_path: &str,
        params: &ScaffoldParams,
    ) -> Result<ProjectInitResult> {
        let project = expand_path(path)?;
        let code_root = match code_path.trim() {
            "" | "." => project.clone(),
            raw => expand_path(raw)?,
        };
        init::init_project(&project, &code_root, params, &self.config)
    }

    fn evaluator(&self) -> FreshnessEvaluator<'_> {
        FreshnessEvaluator::new(&self.hasher, &self.config.sync.model.first_sync_hash)
    }
}
