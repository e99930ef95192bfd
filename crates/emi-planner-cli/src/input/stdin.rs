use std::io::{self, Read};

use emi_planner_core::LoanPlanInput;

/// Read a loan plan piped on stdin.
/// Returns None when stdin is a terminal or the pipe is empty.
pub fn read_plan() -> Result<Option<LoanPlanInput>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let plan = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse loan plan from stdin: {}", e))?;
    tracing::debug!("loan plan read from stdin");
    Ok(Some(plan))
}
