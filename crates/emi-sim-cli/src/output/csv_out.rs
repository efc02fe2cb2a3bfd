use serde_json::Value;
use std::io;

use super::flatten;

/// Write output as CSV to stdout. Numbers are written unrounded.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Array(results)) => write_array_csv(&mut wtr, results),
            Some(result @ Value::Object(_)) => write_fields_csv(&mut wtr, result),
            _ => write_fields_csv(&mut wtr, value),
        },
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

/// Two-column CSV: field, value.
fn write_fields_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) {
    let mut fields = Vec::new();
    flatten("", value, &mut fields);

    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in &fields {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(f: impl FnOnce(&mut csv::Writer<Vec<u8>>)) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        f(&mut wtr);
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_nested_result_is_flattened() {
        let out = render(|w| {
            write_fields_csv(w, &json!({ "prepayment": { "amount": 500.25, "fully_closed": false } }))
        });
        assert_eq!(
            out,
            "field,value\nprepayment.amount,500.25\nprepayment.fully_closed,false\n"
        );
    }

    #[test]
    fn test_tips_array_has_header_row() {
        let out = render(|w| {
            write_array_csv(
                w,
                &[json!({ "kind": "prepayment", "priority": "medium" })],
            )
        });
        assert_eq!(out, "kind,priority\nprepayment,medium\n");
    }
}
