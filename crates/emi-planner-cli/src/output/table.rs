use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::format::display_field;

/// Print a result as tables: scalar fields as Field/Value rows, nested
/// objects and row arrays (schedule, yearly breakdown) as their own sections.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_section("Result", result);
                print_envelope_notes(map);
            } else {
                print_section("", value);
            }
        }
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_section(title: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            let scalars: Vec<(&String, &Value)> =
                map.iter().filter(|(_, v)| !is_nested(v)).collect();
            if !scalars.is_empty() {
                print_heading(title);
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in scalars {
                    builder.push_record([key.as_str(), &format_value(key, val)]);
                }
                println!("{}", Table::from(builder));
            }
            for (key, val) in map.iter().filter(|(_, v)| is_nested(v)) {
                print_section(&heading_for(key), val);
            }
        }
        Value::Array(arr) => {
            print_heading(title);
            print_rows(arr);
        }
        _ => println!("{}", format_value(title, value)),
    }
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(headers.iter().map(|h| heading_for(h)));

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        map.get(h.as_str())
                            .map(|v| format_value(h, v))
                            .unwrap_or_default()
                    })
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value("", item));
        }
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_heading(title: &str) {
    if !title.is_empty() {
        println!("\n{}", title.bold());
    }
}

fn is_nested(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(arr) => arr.iter().any(Value::is_object),
        _ => false,
    }
}

// "yearly_breakdown" -> "Yearly Breakdown"
fn heading_for(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn format_value(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) => display_field(key, s),
        Value::Number(n) => display_field(key, &n.to_string()),
        Value::Bool(b) => (if *b { "yes" } else { "no" }).to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(|v| format_value(key, v)).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_heading_for_snake_case() {
        assert_eq!(heading_for("yearly_breakdown"), "Yearly Breakdown");
        assert_eq!(heading_for("month"), "Month");
    }

    #[test]
    fn test_nested_detection() {
        assert!(is_nested(&json!({"a": 1})));
        assert!(is_nested(&json!([{"month": 1}])));
        assert!(!is_nested(&json!(["a", "b"])));
        assert!(!is_nested(&json!("31507")));
    }

    #[test]
    fn test_format_value_uses_field_kind() {
        assert_eq!(format_value("payment", &json!("31507")), "₹31,507");
        assert_eq!(format_value("rate_solver_converged", &json!(false)), "no");
        assert_eq!(format_value("start_date", &Value::Null), "-");
    }
}
