use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use emi_planner_core::{
    plan_loan, CalculationRequest, LoanAccount, LoanPlanInput, PrepaymentMode, StepUpMode,
    StepUpPolicy, ValidationRules,
};

use crate::input;

/// Loan account and request, given as flags or as a JSON plan file
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PlanArgs {
    /// Outstanding principal on the reference date
    #[arg(long)]
    pub outstanding: Option<Decimal>,

    /// EMI currently being paid
    #[arg(long)]
    pub current_emi: Option<Decimal>,

    /// Originally sanctioned amount (defaults to the outstanding principal)
    #[arg(long)]
    pub sanctioned: Option<Decimal>,

    /// Date of the first installment (YYYY-MM-DD, defaults to --as-of)
    #[arg(long)]
    pub first_installment: Option<NaiveDate>,

    /// Date of the last contractual installment (YYYY-MM-DD)
    #[arg(long)]
    pub last_installment: Option<NaiveDate>,

    /// Reference date; the plan's first installment falls on it (YYYY-MM-DD)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Annual interest rate in percent (e.g. 9 for 9%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// One-off prepayment applied on the reference date
    #[arg(long)]
    pub prepayment: Option<Decimal>,

    /// What the prepayment reduces: reduce-emi or reduce-tenure
    #[arg(long, default_value = "reduce-emi")]
    pub prepayment_type: PrepaymentMode,

    /// EMI step-up mode: none, monthly, yearly or onetime
    #[arg(long, default_value = "none")]
    pub step_up: StepUpMode,

    /// Step-up percentage (e.g. 5 for 5%)
    #[arg(long)]
    pub step_up_pct: Option<Decimal>,

    /// Date from which the step-up applies (YYYY-MM-DD)
    #[arg(long)]
    pub step_up_start: Option<NaiveDate>,

    /// Path to JSON plan file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Resolve the plan from `--input`, stdin or flags, in that order.
/// A `--rules` file replaces whatever rules the plan carried.
pub fn load_plan(
    args: &PlanArgs,
    rules: Option<&str>,
) -> Result<LoanPlanInput, Box<dyn std::error::Error>> {
    let mut plan = if let Some(ref path) = args.input {
        input::file::read_plan(path)?
    } else if let Some(plan) = input::stdin::read_plan()? {
        plan
    } else {
        plan_from_flags(args)?
    };

    if let Some(path) = rules {
        plan.rules = input::file::read_rules(path)?;
    }
    Ok(plan)
}

fn plan_from_flags(args: &PlanArgs) -> Result<LoanPlanInput, Box<dyn std::error::Error>> {
    let outstanding = args
        .outstanding
        .ok_or("--outstanding is required (or provide --input)")?;
    let as_of = args
        .as_of
        .ok_or("--as-of is required (or provide --input)")?;

    let account = LoanAccount {
        sanctioned_amount: args.sanctioned.unwrap_or(outstanding),
        outstanding_principal: outstanding,
        current_emi: args
            .current_emi
            .ok_or("--current-emi is required (or provide --input)")?,
        first_installment: args.first_installment.unwrap_or(as_of),
        last_installment: args
            .last_installment
            .ok_or("--last-installment is required (or provide --input)")?,
        initial_paid_emi: None,
    };

    let step_up = match args.step_up {
        StepUpMode::None => StepUpPolicy::none(),
        mode => StepUpPolicy {
            mode,
            percentage: args
                .step_up_pct
                .ok_or("--step-up-pct is required with --step-up")?,
            start_date: args.step_up_start,
        },
    };

    let request = CalculationRequest {
        interest_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
        prepayment_amount: args.prepayment.unwrap_or(Decimal::ZERO),
        prepayment_type: args.prepayment_type,
        step_up,
    };

    Ok(LoanPlanInput {
        account,
        request,
        as_of_date: as_of,
        rules: ValidationRules::default(),
    })
}

pub fn run_plan(args: PlanArgs, rules: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    let plan = load_plan(&args, rules)?;
    let output = plan_loan(&plan)?;
    Ok(serde_json::to_value(output)?)
}

/// Summary and analysis merged into one flat view; the yearly rows are left
/// to the `yearly` command.
pub fn run_summary(
    args: PlanArgs,
    rules: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let plan = load_plan(&args, rules)?;
    let output = plan_loan(&plan)?;

    let mut view = serde_json::to_value(&output.result.summary)?;
    let analysis = serde_json::to_value(&output.result.analysis)?;
    if let (Value::Object(fields), Value::Object(extra)) = (&mut view, analysis) {
        fields.remove("yearly_breakdown");
        fields.extend(extra);
    }

    Ok(json!({
        "result": view,
        "methodology": output.methodology,
        "warnings": output.warnings,
    }))
}
