use serde_json::{Map, Value};
use std::io;

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// A full plan writes its schedule rows; schedule and breakdown arrays write
/// one row per element; anything else becomes two-column field,value rows.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let written = match body {
        Value::Object(map) => match map.get("schedule") {
            Some(Value::Array(rows)) => write_rows(&mut wtr, rows),
            _ => write_fields(&mut wtr, map),
        },
        Value::Array(rows) => write_rows(&mut wtr, rows),
        other => wtr.write_record([cell(other)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        tracing::error!(error = %e, "failed to write csv");
    }
}

fn write_rows(wtr: &mut StdoutWriter<'_>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([cell(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for item in rows.iter().filter_map(Value::as_object) {
        let record: Vec<String> = headers
            .iter()
            .map(|h| item.get(*h).map(cell).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}

// Nested objects are flattened one level with dotted keys: analysis.interest_saved
fn write_fields(wtr: &mut StdoutWriter<'_>, map: &Map<String, Value>) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                for (sub, v) in inner.iter().filter(|(_, v)| !v.is_array()) {
                    wtr.write_record([format!("{key}.{sub}"), cell(v)])?;
                }
            }
            Value::Array(_) => {}
            _ => wtr.write_record([key.clone(), cell(val)])?,
        }
    }
    Ok(())
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
