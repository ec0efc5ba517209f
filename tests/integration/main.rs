//! Integration tests for Arbor
//!
//! These tests drive the binary and the library crates together over real
//! project layouts on disk.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};

use arbor_core::{ArborConfig, Document, MODEL_FILE, ModelMeta, TREE_FILE, TreeMeta, read_document};
use arbor_engine::Engine;
use arbor_indexer::ContentHasher;
use serde_json::{Value, json};
use tempfile::TempDir;

const GO_SOURCE: &str = "package shop\n\n// Cart holds items.\ntype Cart struct {\n\tItems []string\n}\n\n// Add appends an item.\nfunc (c *Cart) Add(item string) {\n\tc.Items = append(c.Items, item)\n}\n";

const RUST_SOURCE: &str = "/// Price in cents.\npub struct Price(pub u64);\n\npub fn apply_discount(p: &Price, pct: u64) -> u64 {\n    p.0 - p.0 * pct / 100\n}\n";

/// A project with a documented Go leaf, an undocumented Rust leaf and a vendored dependency.
fn create_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let files = [
        ("shop/cart.go", GO_SOURCE),
        ("shop/codespec.md", "---\ntitle: Shop\ntype: service\nsummary: Cart handling\n---\n"),
        ("pricing/price.rs", RUST_SOURCE),
        ("vendor/ext/lib.go", "package ext\n"),
    ];
    for (path, content) in files {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    dir
}

/// Isolated home plus an explicit config that never reaches for ctags.
struct Env {
    home: TempDir,
}

impl Env {
    fn new() -> Self {
        let home = TempDir::new().unwrap();
        fs::write(
            home.path().join("arbor.yaml"),
            "parsing:\n  ctags_binary: arbor-missing-ctags\n",
        )
        .unwrap();
        Self { home }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_arbor"));
        cmd.env("HOME", self.home.path())
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.home.path().join("arbor.yaml"));
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("failed to run arbor")
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "arbor {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }
}

fn offline_engine() -> Engine {
    let mut config = ArborConfig::default();
    config.parsing.ctags_binary = "arbor-missing-ctags".to_string();
    Engine::new(config).unwrap()
}

fn p(path: &Path) -> String {
    path.display().to_string()
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = Command::new(env!("CARGO_BIN_EXE_arbor"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("arbor"));
    assert!(stdout.contains("validate"));
    assert!(stdout.contains("scaffold"));
}

#[test]
fn test_cli_workflow_reaches_valid_state() {
    let env = Env::new();
    let project = create_workspace();
    let root = p(project.path());
    let shop = p(&project.path().join("shop"));
    let pricing = p(&project.path().join("pricing"));

    let output = env.run(&["validate", &root]);
    assert!(!output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["is_valid"], false);

    env.run_json(&["scaffold", &root, ".", "--title", "Workspace", "--summary", "Demo"]);
    env.run_json(&["scaffold", &root, "pricing", "--type", "library", "--title", "Pricing"]);

    let synced = env.run_json(&["sync", &shop]);
    assert_eq!(synced["symbol_count"], 2);
    env.run_json(&["sync", &pricing]);

    let status = env.run_json(&["status", &shop]);
    assert_eq!(status["freshness"]["status"], "fresh");
    assert_eq!(status["summary"], "Cart handling");

    let tree = env.run_json(&["tree", &root]);
    let names: Vec<&str> = tree["components"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["pricing", "shop", "vendor"]);
    assert_eq!(tree["components"][2]["type"], "dependency");

    let output = env.run(&["validate", &root]);
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(output.status.success(), "{report}");
    assert_eq!(report["errors"], json!([]));
}

#[test]
fn test_cli_body_and_exclude() {
    let env = Env::new();
    let project = create_workspace();
    let root = p(project.path());
    let shop = p(&project.path().join("shop"));

    env.run_json(&["sync", &shop]);
    let output = env.run(&["body", &shop, "Add"]);
    assert!(output.status.success());
    let body = String::from_utf8(output.stdout).unwrap();
    assert!(body.starts_with("func (c *Cart) Add(item string) {"));

    env.run_json(&["tree", &root]);
    let tree = env.run_json(&["exclude", &root, "add", "pricing"]);
    assert_eq!(tree["excludes"], json!(["pricing"]));

    let doc: Document<TreeMeta> = read_document(&project.path().join(TREE_FILE)).unwrap().unwrap();
    assert!(doc.meta.components.iter().all(|c| c.name != "pricing"));

    let output = env.run(&["exclude", &root, "toggle", "pricing"]);
    assert!(!output.status.success());
}

#[test]
fn test_serve_over_stdio() {
    let env = Env::new();
    let project = create_workspace();
    let shop = p(&project.path().join("shop"));

    let mut child = env
        .command()
        .arg("serve")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start server");

    let mut stdin = child.stdin.take().unwrap();
    let requests = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
               "params": {"name": "arbor_sync_codemodel", "arguments": {"path": shop}}}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "arbor_query_context", "arguments": {"path": shop}}}),
    ];
    for request in &requests {
        writeln!(stdin, "{request}").unwrap();
    }
    drop(stdin);

    let reader = BufReader::new(child.stdout.take().unwrap());
    let responses: Vec<Value> = reader
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
        .collect();
    assert!(child.wait().unwrap().success());

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "arbor");
    assert_eq!(responses[1]["id"], 2);

    let ctx: Value =
        serde_json::from_str(responses[2]["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(ctx["freshness"]["status"], "fresh");
}

#[test]
fn test_persisted_hash_matches_indexer() {
    let project = create_workspace();
    let shop = project.path().join("shop");
    let engine = offline_engine();

    let result = engine.sync_model(&p(&shop)).unwrap();

    let hasher = ContentHasher::new(&ArborConfig::default().scope).unwrap();
    let digest = hasher.digest(&shop).unwrap();
    assert_eq!(result.src_hash, digest.hash);

    let doc: Document<ModelMeta> = read_document(&shop.join(MODEL_FILE)).unwrap().unwrap();
    assert_eq!(doc.meta.integrity.src_hash, digest.hash);
    assert_eq!(doc.meta.symbols.len(), 2);
    assert_eq!(doc.meta.symbols[1].parent.as_deref(), Some("Cart"));
}

#[test]
fn test_project_config_layer_applies_to_tree() {
    let project = create_workspace();
    fs::write(
        project.path().join(".arbor.yaml"),
        "sync:\n  tree:\n    fallback_description: Undocumented\n    shallow_dirs: []\n",
    )
    .unwrap();

    let meta = offline_engine().sync_tree(&p(project.path())).unwrap();
    let pricing = meta.components.iter().find(|c| c.name == "pricing").unwrap();
    assert_eq!(pricing.description, "Undocumented");

    let vendor = meta.components.iter().find(|c| c.name == "vendor").unwrap();
    assert_eq!(vendor.children.len(), 1);
    assert_eq!(vendor.children[0].path, "./vendor/ext");
}

#[test]
fn test_cli_init_project_installs_agent_assets_from_home() {
    let env = Env::new();
    let assets = env.home.path().join(".arbor/agent/rules");
    fs::create_dir_all(&assets).unwrap();
    fs::write(assets.join("metadata.md"), "Sync codemodel.md after edits.\n").unwrap();

    let project = create_workspace();
    let root = p(project.path());

    let agent = env.run_json(&["init-agent", &root]);
    assert_eq!(agent["created"], json!(["rules/metadata.md"]));

    let init = env.run_json(&["init-project", &root, "--title", "Workspace", "--summary", "Demo"]);
    assert_eq!(init["components"], 3);
    assert_eq!(init["agent"]["skipped"], json!(["rules/metadata.md"]));
    assert_eq!(init["warnings"], json!([]));
    assert!(project.path().join(TREE_FILE).is_file());
    assert!(project.path().join(".agent/rules/metadata.md").is_file());

    let status = env.run_json(&["status", &root]);
    assert_eq!(status["summary"], "Demo");
}
