//! MCP prompts
//!
//! Guided multi-step workflows built from the calculator tools.

use crate::error::McpError;
use crate::mcp::types::{
    GetPromptResult, McpPromptDefinition, PromptArgument, PromptMessage, ToolContent,
};
use serde_json::{Map, Value};

/// Name of the profit-margin walkthrough
pub const PROFIT_MARGIN_PROMPT: &str = "calculate_profit_margin";

const PROFIT_MARGIN_DESCRIPTION: &str =
    "Guide the user through calculating profit margin: ((Revenue - Costs) / Revenue) × 100";

/// Static prompt catalogue
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptRegistry;

impl PromptRegistry {
    /// Create the registry
    pub fn new() -> Self {
        Self
    }

    /// All prompt definitions
    pub fn definitions(&self) -> Vec<McpPromptDefinition> {
        vec![McpPromptDefinition {
            name: PROFIT_MARGIN_PROMPT.to_string(),
            description: PROFIT_MARGIN_DESCRIPTION.to_string(),
            arguments: vec![
                PromptArgument {
                    name: "revenue".to_string(),
                    description: "Total revenue, if already known".to_string(),
                    required: false,
                },
                PromptArgument {
                    name: "costs".to_string(),
                    description: "Total costs, if already known".to_string(),
                    required: false,
                },
            ],
        }]
    }

    /// Render prompt `name` with optional arguments
    pub fn get(
        &self,
        name: &str,
        arguments: Option<&Map<String, Value>>,
    ) -> Result<GetPromptResult, McpError> {
        match name {
            PROFIT_MARGIN_PROMPT => Ok(GetPromptResult {
                description: PROFIT_MARGIN_DESCRIPTION.to_string(),
                messages: vec![PromptMessage {
                    role: "user".to_string(),
                    content: ToolContent::text(profit_margin_text(arguments)),
                }],
            }),
            _ => Err(McpError::PromptNotFound(name.to_string())),
        }
    }
}

fn profit_margin_text(arguments: Option<&Map<String, Value>>) -> String {
    let known = |key: &str| {
        arguments
            .and_then(|a| a.get(key))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    };

    let mut text = String::from("I'll help you calculate profit margin.\n\n");

    match (known("revenue"), known("costs")) {
        (Some(revenue), Some(costs)) => {
            text.push_str(&format!("Revenue: {}\nCosts: {}\n\n", revenue, costs));
        }
        _ => text.push_str("Please provide:\n1. Total Revenue\n2. Total Costs\n\n"),
    }

    text.push_str(
        "I will:\n\
         1. Use subtract(revenue, costs) to get profit\n\
         2. Use divide(profit, revenue) to get the margin as a decimal\n\
         3. Use multiply(result, 100) to convert to a percentage\n\n\
         The formula is: Profit Margin = ((Revenue - Costs) / Revenue) × 100\n\n\
         You can also store values with store_number() for easy reuse!",
    );
    text
}
