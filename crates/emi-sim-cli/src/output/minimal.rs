use serde_json::Value;

use super::flatten;
use super::table::format_value;

/// Key output fields in order of priority, matched against the last
/// segment of each flattened key.
const PRIORITY_KEYS: [&str; 7] = [
    "installment",
    "new_remaining_periods",
    "progress_percentage",
    "interest_saved",
    "interest_increased",
    "new_installment",
    "title",
];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Tips: the top-ranked one is the answer
    let result = match result {
        Value::Array(arr) => match arr.first() {
            Some(first) => first,
            None => return "(none)".to_string(),
        },
        other => other,
    };

    let mut fields = Vec::new();
    flatten("", result, &mut fields);

    for key in PRIORITY_KEYS {
        let hit = fields.iter().find(|(path, val)| {
            !val.is_null() && path.rsplit('.').next() == Some(key)
        });
        if let Some((_, val)) = hit {
            return format_value(val);
        }
    }

    match fields.first() {
        Some((key, val)) if !key.is_empty() => format!("{}: {}", key, format_value(val)),
        Some((_, val)) => format_value(val),
        None => format_value(result),
    }
}
