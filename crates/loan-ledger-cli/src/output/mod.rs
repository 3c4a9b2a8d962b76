pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Result fields that hold row data rather than scalars.
pub(crate) const ROW_FIELDS: [&str; 3] = ["schedule", "payments", "draws"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of an output envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// First row collection found in a result object.
pub(crate) fn rows_of(result: &Map<String, Value>) -> Option<(&'static str, &Vec<Value>)> {
    ROW_FIELDS
        .iter()
        .find_map(|key| match result.get(*key) {
            Some(Value::Array(rows)) if !rows.is_empty() => Some((*key, rows)),
            _ => None,
        })
}

/// Scalar rendering shared by every text formatter.
pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
