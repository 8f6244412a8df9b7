//! Arithmetic handlers
//!
//! Every operation runs its guard checks first and only reports to the
//! [`HistorySink`] once a result exists. Failed operations never touch
//! the history.

use crate::error::CalcError;
use crate::state::{CalculatorState, OperationKind};
use std::sync::Arc;
use tracing::debug;

/// Receiver for successful calculations
pub trait HistorySink: Send + Sync {
    /// Record a completed calculation
    fn record(&self, operation: OperationKind, a: f64, b: f64, result: f64);
}

impl HistorySink for CalculatorState {
    fn record(&self, operation: OperationKind, a: f64, b: f64, result: f64) {
        CalculatorState::record(self, operation, a, b, result);
    }
}

impl<T: HistorySink + ?Sized> HistorySink for Arc<T> {
    fn record(&self, operation: OperationKind, a: f64, b: f64, result: f64) {
        (**self).record(operation, a, b, result);
    }
}

/// Calculator operations bound to a history sink
#[derive(Debug, Clone)]
pub struct Calculator<S> {
    sink: S,
}

impl<S: HistorySink> Calculator<S> {
    /// Create a calculator reporting to `sink`
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Access the underlying sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn finish(&self, operation: OperationKind, a: f64, b: f64, result: f64) -> f64 {
        debug!(operation = %operation, a, b, result, "Calculation complete");
        self.sink.record(operation, a, b, result);
        result
    }

    /// `a + b`
    pub fn add(&self, a: f64, b: f64) -> f64 {
        self.finish(OperationKind::Add, a, b, a + b)
    }

    /// `a - b`
    pub fn subtract(&self, a: f64, b: f64) -> f64 {
        self.finish(OperationKind::Subtract, a, b, a - b)
    }

    /// `a * b`
    pub fn multiply(&self, a: f64, b: f64) -> f64 {
        self.finish(OperationKind::Multiply, a, b, a * b)
    }

    /// `a / b`, rejecting a zero denominator
    pub fn divide(&self, a: f64, b: f64) -> Result<f64, CalcError> {
        if b == 0.0 {
            return Err(CalcError::DivisionByZero);
        }
        Ok(self.finish(OperationKind::Divide, a, b, a / b))
    }

    /// `base ^ exponent`
    pub fn power(&self, base: f64, exponent: f64) -> f64 {
        self.finish(OperationKind::Power, base, exponent, base.powf(exponent))
    }

    /// Square root, rejecting negative input. Unary, so not recorded.
    pub fn square_root(&self, number: f64) -> Result<f64, CalcError> {
        if number < 0.0 {
            return Err(CalcError::NegativeSquareRoot);
        }
        Ok(number.sqrt())
    }

    /// What percentage `value` is of `total`
    pub fn percentage(&self, value: f64, total: f64) -> Result<f64, CalcError> {
        if total == 0.0 {
            return Err(CalcError::ZeroTotal);
        }
        let result = (value / total) * 100.0;
        Ok(self.finish(OperationKind::from("percentage"), value, total, result))
    }
}
