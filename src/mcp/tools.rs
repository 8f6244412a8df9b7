//! MCP tool definitions and registry
//!
//! This module defines the available MCP tools and their implementations.

use crate::calculator::Calculator;
use crate::error::CalcError;
use crate::feed::{
    FeedSearcher, DEFAULT_CATEGORY_RESULTS, DEFAULT_LATEST_COUNT, DEFAULT_SEARCH_RESULTS,
};
use crate::mcp::types::{McpToolDefinition, ToolCallResult};
use crate::state::{CalculatorState, HistoryOrder};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// A registered MCP tool
pub trait McpTool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;
    /// Tool description
    fn description(&self) -> &str;
    /// Input schema as JSON
    fn input_schema(&self) -> Value;
    /// Get tool definition
    fn definition(&self) -> McpToolDefinition {
        McpToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Message returned by the `secret_message` tool
pub const SECRET_MESSAGE: &str =
    "Thank you for joining us today for this training session! We hope you had a great learning experience, signing off!";

/// Tool registry holding all available tools
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn McpTool>>,
    state: Arc<CalculatorState>,
    calculator: Calculator<Arc<CalculatorState>>,
    feed: FeedSearcher,
}

impl ToolRegistry {
    /// Create a registry with all built-in tools bound to `state` and `feed`
    pub fn new(state: Arc<CalculatorState>, feed: FeedSearcher) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
            calculator: Calculator::new(Arc::clone(&state)),
            state,
            feed,
        };

        for tool in builtin_tools() {
            registry.register(Box::new(tool));
        }

        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Box<dyn McpTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Whether a tool with `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Get all tool definitions, sorted by name
    pub fn definitions(&self) -> Vec<McpToolDefinition> {
        let mut defs: Vec<McpToolDefinition> =
            self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool by name
    #[instrument(skip(self, args))]
    pub async fn execute(&self, name: &str, args: Value) -> ToolCallResult {
        info!("Executing tool: {}", name);

        if !self.tools.contains_key(name) {
            return ToolCallResult::error(format!("Tool not found: {}", name));
        }

        match name {
            "add" | "subtract" | "multiply" | "divide" | "power" => {
                self.execute_binary(name, &args)
            }
            "square_root" => self.execute_square_root(&args),
            "percentage" => self.execute_percentage(&args),
            "store_number" => self.execute_store_number(&args),
            "get_stored_number" => self.execute_get_stored_number(&args),
            "list_stored_numbers" => self.execute_list_stored_numbers(),
            "clear_storage" => self.execute_clear_storage(),
            "calculation_history" => self.execute_history(&args),
            "clear_history" => self.execute_clear_history(),
            "search_feed" => self.execute_search_feed(&args).await,
            "get_latest_feed_content" => self.execute_latest_feed_content(&args).await,
            "get_feed_content_by_category" => self.execute_feed_by_category(&args).await,
            "secret_message" => ToolCallResult::text(SECRET_MESSAGE),
            _ => ToolCallResult::error(format!("Unknown tool: {}", name)),
        }
    }

    fn execute_binary(&self, name: &str, args: &Value) -> ToolCallResult {
        let (a_key, b_key) = if name == "power" {
            ("base", "exponent")
        } else {
            ("a", "b")
        };
        let a = match number_arg(args, a_key) {
            Ok(v) => v,
            Err(e) => return e,
        };
        let b = match number_arg(args, b_key) {
            Ok(v) => v,
            Err(e) => return e,
        };

        let result = match name {
            "add" => Ok(self.calculator.add(a, b)),
            "subtract" => Ok(self.calculator.subtract(a, b)),
            "multiply" => Ok(self.calculator.multiply(a, b)),
            "divide" => self.calculator.divide(a, b),
            _ => Ok(self.calculator.power(a, b)),
        };

        calculation_result(name, result)
    }

    fn execute_square_root(&self, args: &Value) -> ToolCallResult {
        let number = match number_arg(args, "number") {
            Ok(v) => v,
            Err(e) => return e,
        };
        calculation_result("square_root", self.calculator.square_root(number))
    }

    fn execute_percentage(&self, args: &Value) -> ToolCallResult {
        let value = match number_arg(args, "value") {
            Ok(v) => v,
            Err(e) => return e,
        };
        let total = match number_arg(args, "total") {
            Ok(v) => v,
            Err(e) => return e,
        };
        calculation_result("percentage", self.calculator.percentage(value, total))
    }

    fn execute_store_number(&self, args: &Value) -> ToolCallResult {
        let name = match string_arg(args, "name") {
            Ok(n) => n.trim(),
            Err(e) => return e,
        };
        if name.is_empty() {
            return ToolCallResult::error("Parameter 'name' must not be empty");
        }
        let value = match number_arg(args, "value") {
            Ok(v) => v,
            Err(e) => return e,
        };

        let stored_count = self.state.store(name, value);
        ToolCallResult::json(&json!({
            "status": "success",
            "message": format!("Stored '{}' = {}", name, value),
            "stored_count": stored_count
        }))
    }

    fn execute_get_stored_number(&self, args: &Value) -> ToolCallResult {
        let name = match string_arg(args, "name") {
            Ok(n) => n.trim(),
            Err(e) => return e,
        };

        match self.state.get(name) {
            Ok(value) => ToolCallResult::json(&json!({
                "name": name,
                "value": value,
                "status": "found"
            })),
            Err(e) => ToolCallResult::json_error(&json!({
                "name": name,
                "status": "not_found",
                "error": e.to_string()
            })),
        }
    }

    fn execute_list_stored_numbers(&self) -> ToolCallResult {
        let values = self.state.stored_values();
        let count = values.len();
        let stored: Map<String, Value> = values
            .into_iter()
            .map(|(name, value)| (name, json!(value)))
            .collect();

        ToolCallResult::json(&json!({
            "stored_values": stored,
            "count": count,
            "message": "Use get_stored_number(name) to retrieve a specific value"
        }))
    }

    fn execute_clear_storage(&self) -> ToolCallResult {
        let count = self.state.clear_values();
        ToolCallResult::json(&json!({
            "status": "success",
            "message": format!("Cleared {} stored value(s)", count),
            "stored_values": {}
        }))
    }

    fn execute_history(&self, args: &Value) -> ToolCallResult {
        let order = match args.get("order").and_then(Value::as_str) {
            None | Some("newest") => HistoryOrder::MostRecentFirst,
            Some("oldest") => HistoryOrder::InsertionOrder,
            Some(other) => {
                return ToolCallResult::error(format!(
                    "Invalid order '{}': expected 'newest' or 'oldest'",
                    other
                ))
            }
        };

        let records = self.state.history(order);
        ToolCallResult::json(&json!({
            "count": records.len(),
            "capacity": self.state.history_capacity(),
            "history": records
        }))
    }

    fn execute_clear_history(&self) -> ToolCallResult {
        let count = self.state.clear_history();
        ToolCallResult::json(&json!({
            "status": "success",
            "message": format!("Cleared {} history record(s)", count)
        }))
    }

    async fn execute_search_feed(&self, args: &Value) -> ToolCallResult {
        let query = match string_arg(args, "query") {
            Ok(q) => q,
            Err(e) => return e,
        };
        let max_results = match count_arg(args, "max_results", DEFAULT_SEARCH_RESULTS) {
            Ok(n) => n,
            Err(e) => return e,
        };

        match self.feed.search(query, max_results).await {
            Ok(hits) if hits.is_empty() => {
                ToolCallResult::json(&json!([{ "message": "No content found matching your query" }]))
            }
            Ok(hits) => ToolCallResult::json(&json!(hits)),
            Err(e) => {
                error!("Feed search failed: {}", e);
                ToolCallResult::error(format!("Feed search failed: {}", e))
            }
        }
    }

    async fn execute_latest_feed_content(&self, args: &Value) -> ToolCallResult {
        let count = match count_arg(args, "count", DEFAULT_LATEST_COUNT) {
            Ok(n) => n,
            Err(e) => return e,
        };

        match self.feed.latest(count).await {
            Ok(items) => ToolCallResult::json(&json!(items)),
            Err(e) => {
                error!("Feed fetch failed: {}", e);
                ToolCallResult::error(format!("Feed fetch failed: {}", e))
            }
        }
    }

    async fn execute_feed_by_category(&self, args: &Value) -> ToolCallResult {
        let category = match string_arg(args, "category") {
            Ok(c) => c,
            Err(e) => return e,
        };
        let max_results = match count_arg(args, "max_results", DEFAULT_CATEGORY_RESULTS) {
            Ok(n) => n,
            Err(e) => return e,
        };

        match self.feed.by_category(category, max_results).await {
            Ok(hits) if hits.is_empty() => ToolCallResult::json(&json!([{
                "message": format!("No content found for category '{}'", category)
            }])),
            Ok(hits) => ToolCallResult::json(&json!(hits)),
            Err(e) => {
                error!("Feed category filter failed: {}", e);
                ToolCallResult::error(format!("Feed search failed: {}", e))
            }
        }
    }
}

fn calculation_result(operation: &str, result: Result<f64, CalcError>) -> ToolCallResult {
    match result {
        Ok(value) => ToolCallResult::json(&json!({
            "operation": operation,
            "result": number_value(value)
        })),
        Err(e) => ToolCallResult::json_error(&json!({
            "operation": operation,
            "error": e.to_string()
        })),
    }
}

fn number_arg(args: &Value, key: &str) -> Result<f64, ToolCallResult> {
    match args.get(key) {
        Some(v) => v.as_f64().ok_or_else(|| {
            ToolCallResult::error(format!("Parameter '{}' must be a number", key))
        }),
        None => Err(ToolCallResult::error(format!(
            "Missing required parameter: {}",
            key
        ))),
    }
}

fn string_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolCallResult> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolCallResult::error(format!("Missing required parameter: {}", key)))
}

/// Non-finite results are rendered as text (`inf`, `-inf`, `NaN`), matching
/// the history expression, since JSON numbers cannot carry them
fn number_value(value: f64) -> Value {
    if value.is_finite() {
        json!(value)
    } else {
        json!(value.to_string())
    }
}

/// Optional count argument. Integral floats and numeric strings are
/// accepted; values below 1 become 1.
fn count_arg(args: &Value, key: &str, default: usize) -> Result<usize, ToolCallResult> {
    let invalid = || ToolCallResult::error(format!("Parameter '{}' must be an integer", key));

    let count = match args.get(key) {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i,
            None => integral(n.as_f64()).ok_or_else(invalid)?,
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(i) => i,
                Err(_) => integral(s.parse::<f64>().ok()).ok_or_else(invalid)?,
            }
        }
        Some(_) => return Err(invalid()),
    };

    Ok(count.max(1) as usize)
}

fn integral(value: Option<f64>) -> Option<i64> {
    value
        .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() <= i64::MAX as f64)
        .map(|v| v as i64)
}

// ============================================================================
// Tool Definitions
// ============================================================================

/// Built-in tool described by static metadata
struct BuiltinTool {
    name: &'static str,
    description: &'static str,
    schema: fn() -> Value,
}

impl McpTool for BuiltinTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn input_schema(&self) -> Value {
        (self.schema)()
    }
}

fn builtin_tools() -> Vec<BuiltinTool> {
    vec![
        BuiltinTool {
            name: "add",
            description: "Add two numbers",
            schema: || binary_schema("First number", "Second number"),
        },
        BuiltinTool {
            name: "subtract",
            description: "Subtract b from a",
            schema: || binary_schema("First number", "Number subtracted from a"),
        },
        BuiltinTool {
            name: "multiply",
            description: "Multiply two numbers",
            schema: || binary_schema("First number", "Second number"),
        },
        BuiltinTool {
            name: "divide",
            description: "Divide a by b. Fails when b is zero",
            schema: || binary_schema("Numerator", "Denominator"),
        },
        BuiltinTool {
            name: "power",
            description: "Raise a number to a power",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "base": { "type": "number", "description": "The base number" },
                        "exponent": { "type": "number", "description": "The exponent" }
                    },
                    "required": ["base", "exponent"]
                })
            },
        },
        BuiltinTool {
            name: "square_root",
            description: "Calculate the square root of a non-negative number",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "number": {
                            "type": "number",
                            "description": "The number to find the square root of"
                        }
                    },
                    "required": ["number"]
                })
            },
        },
        BuiltinTool {
            name: "percentage",
            description: "Calculate what percentage value is of total",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "value": { "type": "number", "description": "The part" },
                        "total": { "type": "number", "description": "The whole (must not be zero)" }
                    },
                    "required": ["value", "total"]
                })
            },
        },
        BuiltinTool {
            name: "store_number",
            description: "Store a number under a name for later use",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Variable name (e.g. 'revenue', 'pi', 'tax_rate')"
                        },
                        "value": { "type": "number", "description": "The value to store" }
                    },
                    "required": ["name", "value"]
                })
            },
        },
        BuiltinTool {
            name: "get_stored_number",
            description: "Retrieve a previously stored number",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Variable name to retrieve" }
                    },
                    "required": ["name"]
                })
            },
        },
        BuiltinTool {
            name: "list_stored_numbers",
            description: "List all stored numbers, sorted by name",
            schema: empty_schema,
        },
        BuiltinTool {
            name: "clear_storage",
            description: "Clear all stored numbers",
            schema: empty_schema,
        },
        BuiltinTool {
            name: "calculation_history",
            description: "Show the most recent calculations",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "order": {
                            "type": "string",
                            "enum": ["newest", "oldest"],
                            "description": "Listing order (default: newest)",
                            "default": "newest"
                        }
                    }
                })
            },
        },
        BuiltinTool {
            name: "clear_history",
            description: "Clear the calculation history",
            schema: empty_schema,
        },
        BuiltinTool {
            name: "search_feed",
            description: "Search feed content by title or description",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search term to find in titles or descriptions"
                        },
                        "max_results": {
                            "type": "integer",
                            "description": "Maximum number of results (default: 3)",
                            "default": DEFAULT_SEARCH_RESULTS
                        }
                    },
                    "required": ["query"]
                })
            },
        },
        BuiltinTool {
            name: "get_latest_feed_content",
            description: "Get the most recent feed entries with short summaries",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "count": {
                            "type": "integer",
                            "description": "Number of entries to return (default: 5)",
                            "default": DEFAULT_LATEST_COUNT
                        }
                    }
                })
            },
        },
        BuiltinTool {
            name: "get_feed_content_by_category",
            description: "Filter feed content by category or topic keyword",
            schema: || {
                json!({
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Category keyword (e.g. 'analytics', 'cloud', 'AI', 'SQL')"
                        },
                        "max_results": {
                            "type": "integer",
                            "description": "Maximum number of results (default: 5)",
                            "default": DEFAULT_CATEGORY_RESULTS
                        }
                    },
                    "required": ["category"]
                })
            },
        },
        BuiltinTool {
            name: "secret_message",
            description: "Returns a special message for session attendees",
            schema: empty_schema,
        },
    ]
}

fn binary_schema(a: &str, b: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "a": { "type": "number", "description": a },
            "b": { "type": "number", "description": b }
        },
        "required": ["a", "b"]
    })
}

fn empty_schema() -> Value {
    json!({
        "type": "object",
        "properties": {}
    })
}

/// List of all available tools (for documentation)
pub const AVAILABLE_TOOLS: &[&str] = &[
    "add",
    "subtract",
    "multiply",
    "divide",
    "power",
    "square_root",
    "percentage",
    "store_number",
    "get_stored_number",
    "list_stored_numbers",
    "clear_storage",
    "calculation_history",
    "clear_history",
    "search_feed",
    "get_latest_feed_content",
    "get_feed_content_by_category",
    "secret_message",
];
