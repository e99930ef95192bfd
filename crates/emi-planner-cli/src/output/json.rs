use serde_json::Value;

/// Pretty-print a plan, schedule or breakdown as JSON on stdout.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => tracing::error!(error = %e, "failed to serialise output"),
    }
}
