//! Tool catalogue advertised through `tools/list`

use serde_json::{Value, json};

use crate::protocol::ToolDefinition;

pub const QUERY_CONTEXT: &str = "arbor_query_context";
pub const SYNC_CODEMODEL: &str = "arbor_sync_codemodel";
pub const SYNC_CODETREE: &str = "arbor_sync_codetree";
pub const SCAFFOLD: &str = "arbor_scaffold";
pub const VALIDATE: &str = "arbor_validate";
pub const FUNCTION_INFO: &str = "arbor_function_info";
pub const MANAGE_EXCLUSIONS: &str = "arbor_manage_exclusions";
pub const INIT_AGENT: &str = "arbor_init_agent";
pub const INIT_PROJECT: &str = "arbor_init_project";

fn path_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "path": { "type": "string", "description": description }
        },
        "required": ["path"]
    })
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: QUERY_CONTEXT,
            description: "Return the merged context of a module (codespec intent, codemodel symbols \
                          and current freshness) for an absolute path.",
            input_schema: path_schema("ABSOLUTE path to the module directory."),
        },
        ToolDefinition {
            name: SYNC_CODEMODEL,
            description: "Scan the module's source code and rewrite its codemodel.md. Returns the \
                          symbol count and the integrity hash of the scanned files.",
            input_schema: path_schema("ABSOLUTE path to the module directory."),
        },
        ToolDefinition {
            name: SYNC_CODETREE,
            description: "Scan the project directory and rewrite codetree.md. Returns the component \
                          hierarchy with metadata presence and validity per module.",
            input_schema: path_schema("ABSOLUTE path to the project root."),
        },
        ToolDefinition {
            name: SCAFFOLD,
            description: "Create a module or backfill its missing codespec.md and codemodel.md. \
                          Existing files are never overwritten.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Module directory name, or '.' for the path itself." },
                    "type": { "type": "string", "description": "module, library, service, app or dependency." },
                    "path": { "type": "string", "description": "ABSOLUTE path of the parent directory." },
                    "title": { "type": "string", "description": "Human readable title." },
                    "summary": { "type": "string", "description": "One-line summary of the module." },
                    "context": { "type": "string", "description": "Background written into the codespec.md body." }
                },
                "required": ["name", "path"]
            }),
        },
        ToolDefinition {
            name: VALIDATE,
            description: "Audit the project. Errors report missing or malformed metadata in \
                          significant directories; warnings report stale documents.",
            input_schema: path_schema("ABSOLUTE path to the project root."),
        },
        ToolDefinition {
            name: FUNCTION_INFO,
            description: "Look up a symbol in the module's codemodel.md and return its source body \
                          together with the module context.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "ABSOLUTE path to the module directory." },
                    "symbol": { "type": "string", "description": "Symbol name as listed in codemodel.md." }
                },
                "required": ["path", "symbol"]
            }),
        },
        ToolDefinition {
            name: MANAGE_EXCLUSIONS,
            description: "Add or remove a directory from the project's exclusion list in \
                          codetree.md, then rebuild the tree.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "ABSOLUTE path to the project root." },
                    "target": { "type": "string", "description": "Directory name or root-relative path." },
                    "action": { "type": "string", "enum": ["add", "remove"] }
                },
                "required": ["path", "target", "action"]
            }),
        },
        ToolDefinition {
            name: INIT_AGENT,
            description: "Copy the agent assets installed under the home directory into the \
                          project's .agent/ directory. Existing files are kept. Returns the \
                          copied and kept paths.",
            input_schema: path_schema("ABSOLUTE path to the project root."),
        },
        ToolDefinition {
            name: INIT_PROJECT,
            description: "Initialise a project: install agent assets at the project root, build \
                          codetree.md at the code root and scaffold the code root as a module.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "ABSOLUTE path to the repository root." },
                    "code_path": { "type": "string", "description": "ABSOLUTE path where the code starts, or '.' for the repository root." },
                    "title": { "type": "string", "description": "Title of the code root module." },
                    "summary": { "type": "string", "description": "One-line summary of the code root module." },
                    "context": { "type": "string", "description": "Background written into the codespec.md body." }
                },
                "required": ["path", "code_path"]
            }),
        },
    ]
}
