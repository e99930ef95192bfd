pub mod csv_out;
pub mod format;
pub mod json;
pub mod minimal;
pub mod table;

use clap::ValueEnum;
use serde_json::Value;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON, amounts as exact decimal strings
    #[default]
    Json,
    /// Tables with rupee amounts, short dates and two-decimal rates
    Table,
    /// One CSV row per schedule entry or year
    Csv,
    /// The headline figure only
    Minimal,
}

/// Write `value` in the requested format.
pub fn render(format: OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}
