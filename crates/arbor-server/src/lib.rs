//! Stdio JSON-RPC adapter exposing the engine use cases as tools

pub mod protocol;
pub mod server;
pub mod tools;


pub use protocol::{CallToolResult, JsonRpcRequest, JsonRpcResponse, RpcError};
pub use server::Server;
