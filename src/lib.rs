//! Enhanced Calculator - MCP server for calculation, named values and feed search
//!
//! This crate provides an MCP (Model Context Protocol) server that gives AI
//! agents a calculator with memory: arithmetic tools, a named-value store,
//! a bounded calculation history, and a keyword search over an RSS/Atom feed.
//!
//! # Features
//!
//! - **MCP Server**: stdio and HTTP JSON-RPC transports
//! - **Calculator**: guarded arithmetic that records successful results
//! - **State**: named values plus a FIFO-bounded history, shared across calls
//! - **Resources & Prompts**: markdown views of state and guided workflows
//! - **Feed Search**: keyword, latest and category filters over a feed
//!
//! # Architecture
//!
//! ```text
//! AI Agent ──▶ MCP Server ──▶ ToolRegistry ──▶ Calculator ──▶ HistorySink
//!                  │               │                              │
//!                  ▼               ▼                              ▼
//!           ┌────────────┐  ┌─────────────┐           ┌──────────────────┐
//!           │ Resources  │  │ FeedSearcher│           │ CalculatorState  │
//!           │ Prompts    │  └──────┬──────┘           │  NamedValueStore │
//!           └────────────┘         ▼                  │  HistoryLog      │
//!                              FeedSource             └──────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use enhanced_calc::calculator::Calculator;
//! use enhanced_calc::state::{CalculatorState, HistoryOrder};
//! use std::sync::Arc;
//!
//! let state = Arc::new(CalculatorState::new());
//! let calc = Calculator::new(Arc::clone(&state));
//!
//! assert_eq!(calc.add(2.0, 3.0), 5.0);
//! assert!(calc.divide(1.0, 0.0).is_err());
//!
//! let history = state.history(HistoryOrder::MostRecentFirst);
//! assert_eq!(history.len(), 1);
//! assert_eq!(history[0].expression, "2 + 3 = 5");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod calculator;
pub mod config;
pub mod cors;
pub mod error;
pub mod feed;
pub mod mcp;
pub mod state;

// Re-exports for convenience
pub use calculator::{Calculator, HistorySink};
pub use config::{ServerConfig, Transport};
pub use error::{Error, Result};
pub use mcp::{McpServer, McpTool};
pub use state::{BoundedHistoryLog, CalculatorState, NamedValueStore, OperationKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
