//! Bounded calculation history
//!
//! An append-only log of successful calculations holding at most
//! `capacity` records. When full, the oldest record is evicted first.

use crate::state::render::format_expression;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Number of records kept when no capacity is configured
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Arithmetic operation identifiers used for symbol rendering
///
/// Names outside the fixed set are carried through as [`OperationKind::Other`]
/// and render as their raw name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationKind {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `×`
    Multiply,
    /// `÷`
    Divide,
    /// `^`
    Power,
    /// Any other operation, rendered by name
    Other(String),
}

impl OperationKind {
    /// Operator symbol, or the raw name for unmapped kinds
    pub fn symbol(&self) -> &str {
        match self {
            OperationKind::Add => "+",
            OperationKind::Subtract => "-",
            OperationKind::Multiply => "×",
            OperationKind::Divide => "÷",
            OperationKind::Power => "^",
            OperationKind::Other(name) => name,
        }
    }

    /// Operation name as used by the tool surface
    pub fn name(&self) -> &str {
        match self {
            OperationKind::Add => "add",
            OperationKind::Subtract => "subtract",
            OperationKind::Multiply => "multiply",
            OperationKind::Divide => "divide",
            OperationKind::Power => "power",
            OperationKind::Other(name) => name,
        }
    }
}

impl From<&str> for OperationKind {
    fn from(name: &str) -> Self {
        match name {
            "add" => OperationKind::Add,
            "subtract" => OperationKind::Subtract,
            "multiply" => OperationKind::Multiply,
            "divide" => OperationKind::Divide,
            "power" => OperationKind::Power,
            other => OperationKind::Other(other.to_string()),
        }
    }
}

impl From<String> for OperationKind {
    fn from(name: String) -> Self {
        OperationKind::from(name.as_str())
    }
}

impl From<OperationKind> for String {
    fn from(kind: OperationKind) -> Self {
        kind.name().to_string()
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single successful calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRecord {
    /// Operation that produced the result
    pub operation: OperationKind,
    /// First operand
    pub a: f64,
    /// Second operand
    pub b: f64,
    /// Computed result
    pub result: f64,
    /// Rendered expression, e.g. `2 + 3 = 5`
    pub expression: String,
    /// When the record was appended
    pub recorded_at: DateTime<Utc>,
}

/// Ordering for [`BoundedHistoryLog::list`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryOrder {
    /// Newest first (display order)
    #[default]
    MostRecentFirst,
    /// Oldest first
    InsertionOrder,
}

/// FIFO-evicting log of the most recent calculations
#[derive(Debug, Clone)]
pub struct BoundedHistoryLog {
    records: VecDeque<CalculationRecord>,
    capacity: usize,
}

impl BoundedHistoryLog {
    /// Create a log holding [`DEFAULT_HISTORY_CAPACITY`] records
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a log with a custom capacity (minimum 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a record, evicting the oldest one if the log is full.
    ///
    /// Never fails; non-finite operands and results are stored as given.
    pub fn record(&mut self, operation: OperationKind, a: f64, b: f64, result: f64) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        let expression = format_expression(&operation, a, b, result);
        self.records.push_back(CalculationRecord {
            operation,
            a,
            b,
            result,
            expression,
            recorded_at: Utc::now(),
        });
    }

    /// Records in the requested order. Does not mutate the log.
    pub fn list(&self, order: HistoryOrder) -> Vec<&CalculationRecord> {
        match order {
            HistoryOrder::InsertionOrder => self.records.iter().collect(),
            HistoryOrder::MostRecentFirst => self.records.iter().rev().collect(),
        }
    }

    /// Drop every record, returning how many were discarded
    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of records held
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BoundedHistoryLog {
    fn default() -> Self {
        Self::new()
    }
}
