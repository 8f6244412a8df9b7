//! MCP server implementation
//!
//! This module implements the MCP server that handles JSON-RPC requests
//! and dispatches them to the tool, resource and prompt registries. The
//! stdio loop lives here; the HTTP transport in [`crate::mcp::http`]
//! feeds the same [`McpServer::handle_line`] entry point.
//!
//! # Security
//!
//! The server supports optional token-based authentication via the
//! `CALC_MCP_TOKEN` environment variable. When set, every request must
//! carry a matching `auth_token` field in its params object or it is
//! rejected with error code -32001.

use crate::config::ServerConfig;
use crate::error::{Error, McpError, Result};
use crate::feed::{FeedSearcher, HttpFeedSource, StaticFeedSource};
use crate::mcp::prompts::PromptRegistry;
use crate::mcp::resources::ResourceRegistry;
use crate::mcp::tools::ToolRegistry;
use crate::mcp::types::{
    JsonRpcRequest, JsonRpcResponse, McpCapabilities, McpServerInfo, PromptGetParams,
    ResourceReadParams, ToolCallParams, PROTOCOL_VERSION,
};
use crate::state::CalculatorState;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// JSON-RPC error code for authentication failure (using -32000 range for server errors)
pub const AUTH_ERROR_CODE: i32 = -32001;

/// JSON-RPC error code for an unknown resource URI
pub const RESOURCE_NOT_FOUND_CODE: i32 = -32002;

/// MCP server state
pub struct McpServer {
    /// Tool registry
    tools: ToolRegistry,
    /// Resource registry
    resources: ResourceRegistry,
    /// Prompt registry
    prompts: PromptRegistry,
    /// Shared calculator state
    state: Arc<CalculatorState>,
    /// Server info
    info: McpServerInfo,
    /// Whether the server has been initialized
    initialized: RwLock<bool>,
    /// When Some, all requests must include a matching auth_token in params
    auth_token: Option<String>,
}

impl McpServer {
    /// Build a server from resolved configuration
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let source = HttpFeedSource::with_timeout(config.feed_url.clone(), config.feed_timeout)?;
        let state = Arc::new(CalculatorState::with_history_capacity(
            config.history_capacity,
        ));

        if config.auth_token.is_some() {
            info!("MCP server authentication enabled");
        } else {
            warn!("MCP server running without authentication. Set CALC_MCP_TOKEN to enable.");
        }

        Ok(Self::with_components(
            state,
            FeedSearcher::new(Arc::new(source)),
            config.auth_token.clone(),
        ))
    }

    /// Build a server from explicit parts
    pub fn with_components(
        state: Arc<CalculatorState>,
        feed: FeedSearcher,
        auth_token: Option<String>,
    ) -> Self {
        Self {
            tools: ToolRegistry::new(Arc::clone(&state), feed),
            resources: ResourceRegistry::new(Arc::clone(&state)),
            prompts: PromptRegistry::new(),
            state,
            info: McpServerInfo::default(),
            initialized: RwLock::new(false),
            auth_token: auth_token.filter(|t| !t.is_empty()),
        }
    }

    /// Create a server with a specific authentication token and an empty
    /// offline feed
    ///
    /// This method is primarily for testing purposes. In production, use
    /// `from_config()`.
    pub fn with_auth_token(token: impl Into<String>) -> Self {
        Self::with_components(
            Arc::new(CalculatorState::new()),
            FeedSearcher::new(Arc::new(StaticFeedSource::default())),
            Some(token.into()),
        )
    }

    /// Shared calculator state
    pub fn state(&self) -> &Arc<CalculatorState> {
        &self.state
    }

    /// Server name and version
    pub fn info(&self) -> &McpServerInfo {
        &self.info
    }

    /// Check if authentication is enabled
    pub fn is_auth_enabled(&self) -> bool {
        self.auth_token.is_some()
    }

    /// Whether an `initialize` request has been handled (and not shut down)
    pub async fn is_initialized(&self) -> bool {
        *self.initialized.read().await
    }

    /// Validate authentication for an incoming request
    ///
    /// Passes when no token is configured. Otherwise the request params
    /// must contain a matching `auth_token`, compared in constant time.
    fn validate_auth(&self, request: &JsonRpcRequest) -> std::result::Result<(), JsonRpcResponse> {
        let expected_token = match &self.auth_token {
            Some(token) => token,
            None => return Ok(()),
        };

        let provided_token = request
            .params
            .as_ref()
            .and_then(|p| p.get("auth_token"))
            .and_then(|v| v.as_str());

        match provided_token {
            Some(token) if constant_time_compare(token, expected_token) => {
                debug!("Authentication successful for method: {}", request.method);
                Ok(())
            }
            Some(_) => {
                warn!(method = %request.method, "Authentication failed: invalid token");
                Err(JsonRpcResponse::error(
                    request.id.clone(),
                    AUTH_ERROR_CODE,
                    "Authentication failed: invalid token",
                ))
            }
            None => {
                warn!(
                    method = %request.method,
                    "Authentication failed: missing auth_token in params"
                );
                Err(JsonRpcResponse::error(
                    request.id.clone(),
                    AUTH_ERROR_CODE,
                    "Authentication required: missing auth_token in params",
                ))
            }
        }
    }

    /// Run the MCP server on stdin/stdout until stdin closes
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC from `reader`, writing responses to `writer`
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            "Starting MCP server: {} v{}",
            self.info.name, self.info.version
        );

        if self.is_auth_enabled() {
            info!("Authentication is ENABLED - all requests require valid auth_token");
        } else {
            warn!("Authentication is DISABLED - accepting all requests");
        }

        let mut lines = reader.lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(l)) => l,
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to read line: {}", e);
                    continue;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            if let Some(resp) = self.handle_line(&line).await {
                let json = serde_json::to_string(&resp).unwrap_or_else(|e| {
                    error!("Failed to serialize response: {}", e);
                    r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"}}"#
                        .to_string()
                });

                debug!("Sending: {}", json);

                writer.write_all(json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("MCP server shutting down");
        Ok(())
    }

    /// Handle a single serialized JSON-RPC message
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::parse_error());
            }
        };

        let id = value.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!("Invalid request shape: {}", e);
                return Some(JsonRpcResponse::invalid_request(id));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a JSON-RPC request. Returns `None` for notifications.
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        let is_notification = request.is_notification();
        let method = request.method.as_str();

        info!("Handling method: {}", method);

        if let Err(auth_error) = self.validate_auth(&request) {
            return (!is_notification).then_some(auth_error);
        }

        let result = match method {
            // Lifecycle methods
            "initialize" => self.handle_initialize(request.params).await,
            "initialized" | "notifications/initialized" => return None,
            "shutdown" => self.handle_shutdown().await,
            "ping" => Ok(json!({ "pong": true })),

            // Tool methods
            "tools/list" => Ok(json!({ "tools": self.tools.definitions() })),
            "tools/call" => self.handle_tools_call(request.params).await,

            // Resource methods
            "resources/list" => Ok(json!({ "resources": self.resources.definitions() })),
            "resources/read" => self.handle_resources_read(request.params),

            // Prompt methods
            "prompts/list" => Ok(json!({ "prompts": self.prompts.definitions() })),
            "prompts/get" => self.handle_prompts_get(request.params),

            _ if method.starts_with("notifications/") => return None,
            _ => {
                warn!("Unknown method: {}", method);
                return (!is_notification).then(|| JsonRpcResponse::method_not_found(id, method));
            }
        };

        if is_notification {
            return None;
        }

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => error_response(id, &e),
        })
    }

    /// Handle initialize request
    async fn handle_initialize(&self, params: Option<Value>) -> Result<Value> {
        if let Some(version) = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(|v| v.as_str())
        {
            debug!("Client protocol version: {}", version);
        }

        *self.initialized.write().await = true;

        Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": McpCapabilities::default(),
            "serverInfo": self.info
        }))
    }

    /// Handle shutdown request
    async fn handle_shutdown(&self) -> Result<Value> {
        info!("Handling shutdown");
        *self.initialized.write().await = false;
        Ok(json!(null))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, params: Option<Value>) -> Result<Value> {
        let tool_params: ToolCallParams = parse_params(params)?;

        let result = self
            .tools
            .execute(&tool_params.name, tool_params.arguments)
            .await;

        Ok(serde_json::to_value(result)?)
    }

    /// Handle resources/read request
    fn handle_resources_read(&self, params: Option<Value>) -> Result<Value> {
        let read: ResourceReadParams = parse_params(params)?;
        let contents = self.resources.read(&read.uri)?;
        Ok(json!({ "contents": [contents] }))
    }

    /// Handle prompts/get request
    fn handle_prompts_get(&self, params: Option<Value>) -> Result<Value> {
        let get: PromptGetParams = parse_params(params)?;
        let prompt = self.prompts.get(&get.name, get.arguments.as_ref())?;
        Ok(serde_json::to_value(prompt)?)
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T> {
    let params = params.ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()).into())
}

fn error_response(id: Option<Value>, err: &Error) -> JsonRpcResponse {
    match err {
        Error::Mcp(McpError::InvalidParams(msg)) => JsonRpcResponse::invalid_params(id, msg),
        Error::Mcp(McpError::PromptNotFound(name)) => {
            JsonRpcResponse::invalid_params(id, &format!("unknown prompt '{}'", name))
        }
        Error::Mcp(McpError::ResourceNotFound(uri)) => JsonRpcResponse::error(
            id,
            RESOURCE_NOT_FOUND_CODE,
            format!("Resource not found: {}", uri),
        ),
        other => JsonRpcResponse::internal_error(id, &other.to_string()),
    }
}

/// Constant-time string comparison
///
/// Every byte is compared regardless of where the first difference is.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() != b_bytes.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a_bytes.iter().zip(b_bytes.iter()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> McpServer {
        McpServer::with_components(
            Arc::new(CalculatorState::new()),
            FeedSearcher::new(Arc::new(StaticFeedSource::default())),
            None,
        )
    }

    fn request(method: &str, params: Option<Value>, id: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest::new(method, params, id)
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("short", "longer"));
    }

    #[test]
    fn test_with_auth_token() {
        assert!(McpServer::with_auth_token("test-secret-token").is_auth_enabled());
        assert!(!McpServer::with_auth_token("").is_auth_enabled());
        assert_eq!(server().info().name, "enhanced-calculator");
    }

    #[test]
    fn test_validate_auth_invalid_token() {
        let server = McpServer::with_auth_token("my-secret-token");
        let req = request("ping", Some(json!({ "auth_token": "wrong" })), Some(json!(1)));
        let err = server.validate_auth(&req).unwrap_err();
        let error = err.error.unwrap();
        assert_eq!(error.code, AUTH_ERROR_CODE);
        assert!(error.message.contains("invalid token"));
    }

    #[test]
    fn test_validate_auth_missing_token() {
        let server = McpServer::with_auth_token("my-secret-token");
        let req = request("ping", None, Some(json!(1)));
        let err = server.validate_auth(&req).unwrap_err();
        assert!(err.error.unwrap().message.contains("missing auth_token"));
    }

    #[test]
    fn test_validate_auth_token_not_string() {
        let server = McpServer::with_auth_token("my-secret-token");
        let req = request("ping", Some(json!({ "auth_token": 12345 })), Some(json!(1)));
        assert!(server.validate_auth(&req).is_err());
    }

    #[tokio::test]
    async fn test_handle_request_with_valid_auth() {
        let server = McpServer::with_auth_token("secret");
        let req = request("ping", Some(json!({ "auth_token": "secret" })), Some(json!(1)));
        let response = server.handle_request(req).await.unwrap();
        assert!(response.result.unwrap()["pong"].as_bool().unwrap());
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let server = server();
        assert!(!server.is_initialized().await);
        let req = request(
            "initialize",
            Some(json!({ "protocolVersion": PROTOCOL_VERSION })),
            Some(json!(1)),
        );
        let result = server.handle_request(req).await.unwrap().result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert!(result["capabilities"]["resources"].is_object());
        assert!(result["capabilities"]["prompts"].is_object());
        assert!(server.is_initialized().await);

        server
            .handle_request(request("shutdown", None, Some(json!(2))))
            .await
            .unwrap();
        assert!(!server.is_initialized().await);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = server();
        for method in ["initialized", "notifications/initialized", "notifications/cancelled"] {
            assert!(server.handle_request(request(method, None, None)).await.is_none());
        }
        // a notification for a real method runs but still gets no reply
        let add = request(
            "tools/call",
            Some(json!({"name": "add", "arguments": {"a": 1, "b": 2}})),
            None,
        );
        assert!(server.handle_request(add).await.is_none());
        assert_eq!(server.state().history_len(), 1);
    }

    #[tokio::test]
    async fn test_handle_unknown_method() {
        let response = server()
            .handle_request(request("unknown/method", None, Some(json!(3))))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_tools_call_missing_params() {
        let response = server()
            .handle_request(request("tools/call", None, Some(json!(4))))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_resources_read_unknown() {
        let response = server()
            .handle_request(request(
                "resources/read",
                Some(json!({"uri": "calculator://missing"})),
                Some(json!(5)),
            ))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, RESOURCE_NOT_FOUND_CODE);
    }

    #[tokio::test]
    async fn test_handle_line_parse_error() {
        let response = server().handle_line("{not json").await.unwrap();
        assert_eq!(response.error.unwrap().code, -32700);
    }

    #[tokio::test]
    async fn test_handle_line_invalid_shape() {
        let response = server().handle_line(r#"{"id": 9, "params": {}}"#).await.unwrap();
        assert_eq!(response.id, Some(json!(9)));
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_serve_over_buffers() {
        let server = server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"initialize","params":{},"id":1}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"ping","id":2}"#,
            "\n"
        );
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let pong: JsonRpcResponse = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(pong.id, Some(json!(2)));
    }
}
