use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, rows_of, ROW_FIELDS};

/// Render the result as a field/value table, followed by a table for any
/// schedule, payment or draw rows.
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{}", format_scalar(value));
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => {
            print_fields(result);
            print_rows(result);
            if let Some(Value::Object(loan)) = result.get("loan") {
                println!("\nLoan:");
                print_fields(loan);
            }
            print_notes(envelope);
        }
        _ => print_fields(envelope),
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        if ROW_FIELDS.contains(&key.as_str()) || key == "loan" {
            continue;
        }
        builder.push_record([key.as_str(), &format_scalar(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(result: &Map<String, Value>) {
    let Some((name, rows)) = rows_of(result) else {
        return;
    };
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_scalar).unwrap_or_default()),
            );
        }
    }
    println!("\n{}:", name);
    println!("{}", Table::from(builder));
}

fn print_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
