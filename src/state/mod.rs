//! Shared calculator state
//!
//! [`CalculatorState`] is the single service object every handler works
//! against. It owns the [`NamedValueStore`] and the [`BoundedHistoryLog`],
//! each behind its own mutex, so tool calls dispatched in parallel (HTTP
//! transport) cannot break either structure's invariants.

mod history;
/// Text rendering helpers
pub mod render;
mod store;

pub use history::{
    BoundedHistoryLog, CalculationRecord, HistoryOrder, OperationKind, DEFAULT_HISTORY_CAPACITY,
};
pub use store::NamedValueStore;

use crate::error::StoreError;
use parking_lot::Mutex;
use tracing::debug;

/// Process-wide calculator state, shared as `Arc<CalculatorState>`
#[derive(Debug, Default)]
pub struct CalculatorState {
    values: Mutex<NamedValueStore>,
    history: Mutex<BoundedHistoryLog>,
}

impl CalculatorState {
    /// Create empty state with the default history capacity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty state with a custom history capacity
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            values: Mutex::new(NamedValueStore::new()),
            history: Mutex::new(BoundedHistoryLog::with_capacity(capacity)),
        }
    }

    /// Store a value, returning the number of stored entries afterwards
    pub fn store(&self, name: impl Into<String>, value: f64) -> usize {
        let name = name.into();
        let mut values = self.values.lock();
        debug!(name = %name, value, "Storing value");
        values.set(name, value);
        values.size()
    }

    /// Look up a stored value
    pub fn get(&self, name: &str) -> Result<f64, StoreError> {
        self.values.lock().get(name)
    }

    /// Stored values sorted by name
    pub fn stored_values(&self) -> Vec<(String, f64)> {
        self.values.lock().enumerate()
    }

    /// Number of stored values
    pub fn value_count(&self) -> usize {
        self.values.lock().size()
    }

    /// Clear the value store, returning how many entries were removed
    pub fn clear_values(&self) -> usize {
        self.values.lock().clear()
    }

    /// Append a calculation to the history log
    pub fn record(&self, operation: OperationKind, a: f64, b: f64, result: f64) {
        self.history.lock().record(operation, a, b, result);
    }

    /// Snapshot of the history in the requested order
    pub fn history(&self, order: HistoryOrder) -> Vec<CalculationRecord> {
        self.history
            .lock()
            .list(order)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Number of records in the history log
    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    /// Maximum number of history records kept
    pub fn history_capacity(&self) -> usize {
        self.history.lock().capacity()
    }

    /// Clear the history log, returning how many records were removed
    pub fn clear_history(&self) -> usize {
        self.history.lock().clear()
    }

    /// Markdown view of the stored values
    pub fn render_stored_values(&self) -> String {
        render::stored_values_markdown(&self.stored_values())
    }

    /// Markdown view of the history, newest first
    pub fn render_history(&self) -> String {
        render::history_markdown(&self.history.lock(), HistoryOrder::MostRecentFirst)
    }
}
