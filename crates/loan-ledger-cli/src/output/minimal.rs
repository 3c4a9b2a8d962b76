use serde_json::Value;

use super::{format_scalar, result_of};

/// Key answer for each command, in priority order.
const PRIORITY_KEYS: [&str; 6] = [
    "level_payment",
    "utilization",
    "weighted_average_rate",
    "total_interest",
    "status",
    "loan_id",
];

/// Print just the headline value of the output.
///
/// Lifecycle replays nest the loan one level down, so the `loan` object is
/// searched as well before falling back to the first field.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    let Value::Object(map) = result else {
        println!("{}", format_scalar(result));
        return;
    };

    let scopes = [Some(map), map.get("loan").and_then(Value::as_object)];
    for scope in scopes.into_iter().flatten() {
        for key in PRIORITY_KEYS {
            if let Some(val) = scope.get(key).filter(|v| !v.is_null()) {
                println!("{}", format_scalar(val));
                return;
            }
        }
    }

    if let Some((key, val)) = map.iter().next() {
        println!("{}: {}", key, format_scalar(val));
    }
}
