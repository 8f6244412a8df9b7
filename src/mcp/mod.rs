//! Model Context Protocol (MCP) server module
//!
//! This module implements the MCP server for AI agent integration,
//! exposing calculator tools, state resources and guided prompts over
//! stdio or HTTP.

/// HTTP transport
pub mod http;
/// Guided prompts
pub mod prompts;
/// Read-only state resources
pub mod resources;
mod server;
mod tools;
/// MCP protocol types
pub mod types;

pub use prompts::PromptRegistry;
pub use resources::ResourceRegistry;
pub use server::{McpServer, AUTH_ERROR_CODE, RESOURCE_NOT_FOUND_CODE};
pub use tools::{McpTool, ToolRegistry, AVAILABLE_TOOLS, SECRET_MESSAGE};
pub use types::{
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, McpCapabilities, McpServerInfo,
    McpToolDefinition, ToolCallParams, ToolCallResult, ToolContent,
};
