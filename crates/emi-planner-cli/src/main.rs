mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::plan::PlanArgs;
use commands::schedule::ScheduleArgs;
use output::OutputFormat;

/// EMI planning for an outstanding home loan
#[derive(Parser)]
#[command(
    name = "emi",
    version,
    about = "EMI planning for an outstanding home loan",
    long_about = "Builds the month-by-month repayment schedule of an outstanding loan \
                  under a one-off prepayment and an EMI step-up policy, with the \
                  effective rate, total interest, savings and a calendar-year breakdown. \
                  Set EMI_LOG=debug for diagnostic logging on stderr."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    output: OutputFormat,

    /// Validation rules file (.yaml, .yml or .json)
    #[arg(long, global = true)]
    rules: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full plan: schedule, summary, analysis and warnings
    Plan(PlanArgs),
    /// Monthly schedule, optionally filtered
    Schedule(ScheduleArgs),
    /// Calendar-year breakdown of the schedule
    Yearly(PlanArgs),
    /// Headline figures and savings analysis
    Summary(PlanArgs),
    /// Print version information
    Version,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("EMI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let rules = cli.rules.as_deref();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Plan(args) => commands::plan::run_plan(args, rules),
        Commands::Schedule(args) => commands::schedule::run_schedule(args, rules),
        Commands::Yearly(args) => commands::schedule::run_yearly(args, rules),
        Commands::Summary(args) => commands::plan::run_summary(args, rules),
        Commands::Version => {
            println!("emi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::render(cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
