//! Line-delimited JSON-RPC loop over a reader and a writer
//!
//! Requests are handled strictly in order: one line in, at most one line out.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use arbor_core::Component;
use arbor_engine::{Engine, ExclusionAction, ScaffoldParams};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::protocol::{
    CallToolParams, CallToolResult, InitializeResult, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, PROTOCOL_VERSION, RpcError, ServerCapabilities, ServerInfo, ToolsCapability,
};
use crate::tools;

pub const SERVER_NAME: &str = "arbor";

pub struct Server {
    engine: Engine,
}

impl Server {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// Serve until the reader is exhausted.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        info!("Serving JSON-RPC on stdio");
        for line in reader.lines() {
            let line = line.context("failed to read request line")?;
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_message(&line) {
                writeln!(writer, "{response}").context("failed to write response")?;
                writer.flush().context("failed to flush response")?;
            }
        }
        info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle one raw line. Returns the serialized response, if one is owed.
    pub fn handle_message(&self, line: &str) -> Option<String> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                debug!("Ignoring unparseable line: {}", e);
                return None;
            }
        };
        debug!("Received {}", request.method);

        let outcome = match request.method.as_str() {
            "initialize" => to_value(&self.initialize()),
            "tools/list" => to_value(&ListToolsResult {
                tools: tools::definitions(),
            }),
            "tools/call" => self.call_tool(request.params).and_then(|r| to_value(&r)),
            _ => Err(RpcError::method_not_found()),
        };

        let id = request.id?;
        let response = match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::failure(id, err),
        };
        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                error!("Failed to serialize response: {}", e);
                None
            }
        }
    }

    fn initialize(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: PROTOCOL_VERSION,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    fn call_tool(&self, params: Option<Value>) -> Result<CallToolResult, RpcError> {
        let params: CallToolParams = params
            .and_then(|p| serde_json::from_value(p).ok())
            .ok_or_else(RpcError::parse_error)?;
        info!("Calling tool {}", params.name);

        let engine = &self.engine;
        match params.name.as_str() {
            tools::QUERY_CONTEXT => {
                let ctx = engine.query_context(&params.str_arg("path")).map_err(fail)?;
                json_result(&ctx, false)
            }
            tools::SYNC_CODEMODEL => {
                let result = engine.sync_model(&params.str_arg("path")).map_err(fail)?;
                json_result(&result, false)
            }
            tools::SYNC_CODETREE => {
                let meta = engine.sync_tree(&params.str_arg("path")).map_err(fail)?;
                let has_invalid = meta.components.iter().any(Component::has_invalid);
                json_result(&meta, has_invalid)
            }
            tools::SCAFFOLD => {
                let name = params.str_arg("name");
                if name.is_empty() {
                    return Err(RpcError::invalid_params("Missing required argument: name"));
                }
                let component_type = params.str_arg("type");
                let scaffold = ScaffoldParams {
                    path: params.str_arg("path"),
                    name,
                    component_type: (!component_type.is_empty()).then_some(component_type),
                    title: params.str_arg("title"),
                    summary: params.str_arg("summary"),
                    context: params.str_arg("context"),
                };
                let result = engine.scaffold(&scaffold).map_err(fail)?;
                json_result(&result, false)
            }
            tools::VALIDATE => {
                let report = engine.validate(&params.str_arg("path")).map_err(fail)?;
                json_result(&report, !report.is_valid)
            }
            tools::FUNCTION_INFO => {
                let info = engine
                    .function_info(&params.str_arg("path"), &params.str_arg("symbol"))
                    .map_err(fail)?;
                json_result(&info, false)
            }
            tools::MANAGE_EXCLUSIONS => {
                let action: ExclusionAction = params
                    .str_arg("action")
                    .parse()
                    .map_err(|e: anyhow::Error| RpcError::invalid_params(e.to_string()))?;
                let meta = engine
                    .manage_exclusions(&params.str_arg("path"), &params.str_arg("target"), action)
                    .map_err(fail)?;
                json_result(&meta, false)
            }
            tools::INIT_AGENT => {
                let result = engine.init_agent(&params.str_arg("path")).map_err(fail)?;
                json_result(&result, false)
            }
            tools::INIT_PROJECT => {
                let scaffold = ScaffoldParams {
                    title: params.str_arg("title"),
                    summary: params.str_arg("summary"),
                    context: params.str_arg("context"),
                    ..Default::default()
                };
                let result = engine
                    .init_project(&params.str_arg("path"), &params.str_arg("code_path"), &scaffold)
                    .map_err(fail)?;
                json_result(&result, false)
            }
            other => Err(RpcError::new(
                crate::protocol::METHOD_NOT_FOUND,
                format!("Tool not found: {other}"),
            )),
        }
    }
}

fn fail(err: anyhow::Error) -> RpcError {
    warn!("Tool call failed: {:#}", err);
    RpcError::server(&err)
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::server(&anyhow::Error::from(e)))
}

fn json_result<T: Serialize>(value: &T, is_error: bool) -> Result<CallToolResult, RpcError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| RpcError::server(&anyhow::Error::from(e)))?;
    Ok(CallToolResult::text(text, is_error))
}
