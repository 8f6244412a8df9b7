//! MCP resources
//!
//! Read-only markdown views over the calculator state.

use crate::error::McpError;
use crate::mcp::types::{McpResourceDefinition, ResourceContents};
use crate::state::{render, CalculatorState};
use std::sync::Arc;
use tracing::debug;

/// URI of the stored-values view
pub const STORED_VALUES_URI: &str = "calculator://stored-values";
/// URI of the calculation-history view
pub const HISTORY_URI: &str = "calculator://history";
/// URI of the constants table
pub const CONSTANTS_URI: &str = "calculator://constants";

const MARKDOWN: &str = "text/markdown";

/// Resolves resource URIs against the shared state
pub struct ResourceRegistry {
    state: Arc<CalculatorState>,
}

impl ResourceRegistry {
    /// Create a registry reading from `state`
    pub fn new(state: Arc<CalculatorState>) -> Self {
        Self { state }
    }

    /// All resource definitions
    pub fn definitions(&self) -> Vec<McpResourceDefinition> {
        vec![
            definition(
                STORED_VALUES_URI,
                "Stored Values",
                "All values saved with store_number, sorted by name",
            ),
            definition(
                HISTORY_URI,
                "Calculation History",
                "The most recent calculations, newest first",
            ),
            definition(
                CONSTANTS_URI,
                "Mathematical Constants",
                "Common constants ready to store or use",
            ),
        ]
    }

    /// Render the resource at `uri`
    pub fn read(&self, uri: &str) -> Result<ResourceContents, McpError> {
        debug!("Reading resource: {}", uri);

        let text = match uri {
            STORED_VALUES_URI => self.state.render_stored_values(),
            HISTORY_URI => self.state.render_history(),
            CONSTANTS_URI => render::constants_markdown(),
            _ => return Err(McpError::ResourceNotFound(uri.to_string())),
        };

        Ok(ResourceContents {
            uri: uri.to_string(),
            mime_type: MARKDOWN.to_string(),
            text,
        })
    }
}

fn definition(uri: &str, name: &str, description: &str) -> McpResourceDefinition {
    McpResourceDefinition {
        uri: uri.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        mime_type: MARKDOWN.to_string(),
    }
}
