//! Error types for the calculator MCP server
//!
//! This module provides the error type hierarchy using `thiserror`.
//! Each concern owns a small enum; the crate-level [`Error`] folds them
//! together so `?` works across module boundaries.

use thiserror::Error;

/// The main error type for calculator server operations
#[derive(Error, Debug)]
pub enum Error {
    /// MCP protocol errors
    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),

    /// Named value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Arithmetic guard failures
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalcError),

    /// Feed fetch/parse errors
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    /// Invalid JSON-RPC request
    #[error("Invalid JSON-RPC request: {0}")]
    InvalidRequest(String),

    /// Unknown method
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Tool not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Prompt not found
    #[error("Prompt not found: {0}")]
    PromptNotFound(String),
}

/// Lookup failures in the named value store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No value is stored under the requested name
    #[error("No stored value found for '{name}'. Use list_stored_numbers to see available values.")]
    NotFound {
        /// The name that was looked up
        name: String,
    },
}

impl StoreError {
    /// Remediation hint shown alongside the error
    pub fn hint(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "Use list_stored_numbers to see available values.",
        }
    }
}

/// Arithmetic guard failures raised before anything reaches the history log
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    /// Denominator was zero
    #[error("Cannot divide by zero")]
    DivisionByZero,

    /// Square root of a negative number
    #[error("Cannot calculate square root of negative number")]
    NegativeSquareRoot,

    /// Percentage of a zero total
    #[error("Total cannot be zero")]
    ZeroTotal,
}

/// Feed fetch and parse errors
#[derive(Error, Debug)]
pub enum FeedError {
    /// Transport-level failure talking to the feed host
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP error {status} fetching {url}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Feed URL
        url: String,
    },

    /// Document is not RSS or Atom
    #[error("Invalid feed: {0}")]
    InvalidFeed(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FeedError::Http {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => FeedError::Network(err.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A variable held a value that could not be parsed
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Variable or flag name
        key: String,
        /// Parse failure detail
        message: String,
    },

    /// Feed URL is not an absolute http(s) URL
    #[error("Invalid feed URL '{0}'")]
    InvalidFeedUrl(String),
}

/// Result type alias for calculator server operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Store(StoreError::NotFound {
            name: "rate".to_string(),
        });
        assert!(err.to_string().contains("No stored value found for 'rate'"));
        assert!(err.to_string().contains("list_stored_numbers"));
    }

    #[test]
    fn test_mcp_error() {
        let err = McpError::ToolNotFound("unknown_tool".to_string());
        assert_eq!(err.to_string(), "Tool not found: unknown_tool");
    }

    #[test]
    fn test_calc_error_messages() {
        assert_eq!(CalcError::DivisionByZero.to_string(), "Cannot divide by zero");
        assert_eq!(
            CalcError::NegativeSquareRoot.to_string(),
            "Cannot calculate square root of negative number"
        );
        assert_eq!(CalcError::ZeroTotal.to_string(), "Total cannot be zero");
    }

    #[test]
    fn test_feed_http_error() {
        let err = FeedError::Http {
            status: 404,
            url: "https://example.com/rss".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("example.com"));
    }

    #[test]
    fn test_store_error_hint() {
        let err = StoreError::NotFound {
            name: "x".to_string(),
        };
        assert!(err.hint().contains("list_stored_numbers"));
    }

    #[test]
    fn test_generic_error() {
        let err = Error::generic("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }
}
