//! Text rendering shared by the history log and the resource views

use crate::state::history::{BoundedHistoryLog, HistoryOrder, OperationKind};
use std::f64::consts;
use std::fmt::Write;

/// Mathematical constants published by the `calculator://constants` resource
pub const CONSTANTS: &[(&str, &str, f64)] = &[
    ("pi", "Ratio of a circle's circumference to its diameter", consts::PI),
    ("e", "Base of the natural logarithm", consts::E),
    ("tau", "Full turn in radians (2π)", consts::TAU),
    ("sqrt2", "Square root of 2", consts::SQRT_2),
    ("ln2", "Natural logarithm of 2", consts::LN_2),
    ("ln10", "Natural logarithm of 10", consts::LN_10),
    ("phi", "Golden ratio", 1.618_033_988_749_895),
];

/// Render `a <symbol> b = result`
pub fn format_expression(operation: &OperationKind, a: f64, b: f64, result: f64) -> String {
    format!("{} {} {} = {}", a, operation.symbol(), b, result)
}

/// Markdown view of stored values. Expects `values` sorted by name.
pub fn stored_values_markdown(values: &[(String, f64)]) -> String {
    let mut out = String::from("# Stored Values\n\n");

    if values.is_empty() {
        out.push_str("No values stored yet.\n\n");
        out.push_str("Use store_number(name, value) to save values for later use.");
        return out;
    }

    let _ = writeln!(out, "Total stored: {}\n", values.len());
    for (name, value) in values {
        let _ = writeln!(out, "- **{}**: {}", name, value);
    }
    out.push_str("\nUse get_stored_number(name) to retrieve a value.\n");
    out.push_str("Use list_stored_numbers() to see all values as JSON.");
    out
}

/// Markdown view of the calculation history in `order`
pub fn history_markdown(log: &BoundedHistoryLog, order: HistoryOrder) -> String {
    let mut out = String::from("# Calculation History\n\n");
    let records = log.list(order);

    if records.is_empty() {
        out.push_str("No calculations yet.");
        return out;
    }

    let ordering = match order {
        HistoryOrder::MostRecentFirst => "newest first",
        HistoryOrder::InsertionOrder => "oldest first",
    };
    let _ = writeln!(
        out,
        "Showing {} of the last {} calculations, {}.\n",
        records.len(),
        log.capacity(),
        ordering
    );

    for (idx, record) in records.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. `{}` ({})",
            idx + 1,
            record.expression,
            record.recorded_at.format("%H:%M:%S")
        );
    }
    out
}

/// Markdown table of [`CONSTANTS`]
pub fn constants_markdown() -> String {
    let mut out = String::from("# Mathematical Constants\n\n");
    out.push_str("| Name | Value | Description |\n|------|-------|-------------|\n");
    for (name, description, value) in CONSTANTS {
        let _ = writeln!(out, "| {} | {} | {} |", name, value, description);
    }
    out.push_str("\nStore any of these with store_number(name, value).");
    out
}
