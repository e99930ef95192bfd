use clap::Args;
use serde_json::Value;

use emi_planner_core::{
    compute_schedule_with_rules, filter_schedule, CalculationResult, Money, ScheduleFilter,
};

use super::plan::{load_plan, PlanArgs};

#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Which installments to list: all, yearly or step-up
    #[arg(long, default_value = "all")]
    pub filter: ScheduleFilter,
}

pub fn run_schedule(
    args: ScheduleArgs,
    rules: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let (result, current_emi) = compute(&args.plan, rules)?;
    let entries = filter_schedule(&result.schedule, args.filter, current_emi);
    tracing::debug!(
        filter = %args.filter,
        kept = entries.len(),
        total = result.schedule.len(),
        "schedule filtered"
    );
    Ok(serde_json::to_value(entries)?)
}

pub fn run_yearly(args: PlanArgs, rules: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    let (result, _) = compute(&args, rules)?;
    Ok(serde_json::to_value(result.summary.yearly_breakdown)?)
}

fn compute(
    args: &PlanArgs,
    rules: Option<&str>,
) -> Result<(CalculationResult, Money), Box<dyn std::error::Error>> {
    let plan = load_plan(args, rules)?;
    let result = compute_schedule_with_rules(
        &plan.account,
        &plan.request,
        plan.as_of_date,
        &plan.rules,
    )?;
    Ok((result, plan.account.current_emi))
}
