use serde_json::Value;

/// Headline fields. A plan nests them under `summary`.
const HEADLINE_KEYS: &[&str] = &["base_emi", "months_remaining"];

/// Print just the headline figure: the new EMI and tenure for a plan, the
/// row count for a schedule or breakdown.
pub fn print_minimal(value: &Value) {
    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    println!("{}", headline(body));
}

fn headline(body: &Value) -> String {
    match body {
        Value::Object(map) => {
            let source = match map.get("summary") {
                Some(Value::Object(summary)) => summary,
                _ => map,
            };
            let picked: Vec<String> = HEADLINE_KEYS
                .iter()
                .filter_map(|k| source.get(*k).filter(|v| !v.is_null()).map(plain))
                .collect();
            if !picked.is_empty() {
                return picked.join(" ");
            }
            match map.iter().next() {
                Some((key, val)) => format!("{}: {}", key, plain(val)),
                None => String::new(),
            }
        }
        Value::Array(rows) => format!("{} rows", rows.len()),
        other => plain(other),
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_headline_is_emi_and_tenure() {
        let plan = json!({
            "schedule": [],
            "summary": { "base_emi": "29000.12", "months_remaining": 123 }
        });
        assert_eq!(headline(&plan), "29000.12 123");
    }

    #[test]
    fn test_rows_counted() {
        assert_eq!(headline(&json!([{"month": 1}, {"month": 2}])), "2 rows");
    }

    #[test]
    fn test_fallback_to_first_field() {
        assert_eq!(headline(&json!({"baseline_months": 123})), "baseline_months: 123");
    }
}
